//! Candidate matching for careers, majors, and companies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::Dimension;
use super::normalization::{round_tenth, ScoreVector, NEUTRAL_SCORE};

/// Readiness swing applied at the extremes of the overall score.
const READINESS_SPAN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateCategory {
    Career,
    Major,
    Company,
}

impl CandidateCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Major => "major",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for CandidateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown candidate category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for CandidateCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "career" | "careers" => Ok(Self::Career),
            "major" | "majors" => Ok(Self::Major),
            "company" | "companies" => Ok(Self::Company),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Static candidate entry tagged with the dimensions it weighs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub category: CandidateCategory,
    pub dimensions: Vec<Dimension>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    /// Mean scaled score over the candidate's dimensions.
    pub fn base_match(&self, scores: &ScoreVector) -> f64 {
        if self.dimensions.is_empty() {
            return NEUTRAL_SCORE;
        }
        let total: f64 = self
            .dimensions
            .iter()
            .map(|dimension| scores.get(dimension))
            .sum();
        total / self.dimensions.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub candidate_id: String,
    pub title: String,
    pub category: CandidateCategory,
    pub match_percentage: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Offset added to every match, positive for above-neutral overall scores.
pub fn readiness_offset(overall: f64) -> f64 {
    (overall - NEUTRAL_SCORE) / 100.0 * READINESS_SPAN
}

pub struct RecommendationRanker<'a> {
    candidates: &'a [Candidate],
}

impl<'a> RecommendationRanker<'a> {
    pub fn new(candidates: &'a [Candidate]) -> Self {
        Self { candidates }
    }

    /// Ranks candidates by adjusted match, highest first. Equal matches keep catalog order.
    pub fn rank(
        &self,
        scores: &ScoreVector,
        overall: f64,
        category: Option<CandidateCategory>,
        limit: usize,
    ) -> Vec<RecommendationItem> {
        let offset = readiness_offset(overall);

        let mut ranked: Vec<RecommendationItem> = self
            .candidates
            .iter()
            .filter(|candidate| category.map_or(true, |wanted| candidate.category == wanted))
            .map(|candidate| RecommendationItem {
                candidate_id: candidate.id.clone(),
                title: candidate.title.clone(),
                category: candidate.category,
                match_percentage: round_tenth(
                    (candidate.base_match(scores) + offset).clamp(0.0, 100.0),
                ),
                metadata: candidate.metadata.clone(),
            })
            .collect();

        ranked.sort_by(|left, right| right.match_percentage.total_cmp(&left.match_percentage));
        ranked.truncate(limit);
        ranked
    }
}
