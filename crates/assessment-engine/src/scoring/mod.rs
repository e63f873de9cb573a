//! Assessment scoring: response aggregation, normalization, validity, profiling, and matching.
//!
//! [`ScoringEngine::score_attempt`] is a pure function of the response stream and the
//! registry entry for the requested type. Per-response problems are recovered locally and
//! reported in [`ScoringResult::issues`]; only an unknown assessment type is an error.

pub mod aggregation;
pub mod catalog;
pub mod domain;
pub mod import;
pub mod normalization;
pub mod profile;
pub mod ranking;
pub mod registry;
pub mod repository;
pub mod router;
pub mod sample;
pub mod service;
pub mod validity;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use aggregation::{
    ranking_delta, Aggregator, IssueKind, KeywordScorer, MalformedResponseError, ResponseIssue,
    WrittenResponseScorer,
};
pub use catalog::{CatalogError, CatalogLookupError, ItemCatalog};
pub use domain::{
    AssessmentTypeId, Dimension, DimensionScore, DimensionWeight, InteractionSignals, Item,
    ItemId, ItemKind, ItemScoring, Response, ResponseValue, ScoreLevel, SignalTable, SpeedCurve,
    ValidityKind,
};
pub use import::{candidates_from_csv, responses_from_csv, ImportError};
pub use normalization::{NormalizationRule, Normalizer, ScoreVector, NEUTRAL_SCORE};
pub use profile::{classify, Archetype, Profile};
pub use ranking::{Candidate, CandidateCategory, RecommendationItem, RecommendationRanker};
pub use registry::{
    AssessmentRegistry, AssessmentTypeConfig, AssessmentTypeSummary, DimensionSpec, RegistryError,
};
pub use repository::{
    AttemptId, AttemptRecord, AttemptRepository, AttemptSummaryView, RepositoryError,
};
pub use router::assessment_router;
pub use sample::{sample_responses, SampleStyle};
pub use service::{AssessmentScoringService, AttemptServiceError};
pub use validity::{
    DistortionIndicator, ReliabilityVerdict, ValidityAnalyzer, ValidityMetrics,
    ValidityThresholds,
};

/// Complete outcome for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub assessment_type: AssessmentTypeId,
    pub dimension_scores: Vec<DimensionScore>,
    pub overall_score: f64,
    pub profile: Profile,
    pub validity_metrics: ValidityMetrics,
    pub recommendations: Vec<RecommendationItem>,
    pub scored_responses: usize,
    #[serde(default)]
    pub issues: Vec<ResponseIssue>,
}

impl ScoringResult {
    pub fn dimension(&self, dimension: &str) -> Option<&DimensionScore> {
        self.dimension_scores
            .iter()
            .find(|score| score.dimension.as_str() == dimension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("unknown assessment type `{0}`")]
    InvalidAssessmentType(String),
}

/// Stateless scorer shared across attempts; the registry is the only shared data.
#[derive(Clone)]
pub struct ScoringEngine {
    registry: Arc<AssessmentRegistry>,
    written: Arc<dyn WrittenResponseScorer>,
    validity: ValidityAnalyzer,
    recommendation_limit: Option<usize>,
}

impl ScoringEngine {
    pub fn new(registry: Arc<AssessmentRegistry>) -> Self {
        Self {
            registry,
            written: Arc::new(KeywordScorer),
            validity: ValidityAnalyzer::default(),
            recommendation_limit: None,
        }
    }

    /// Engine over the built-in assessment types.
    pub fn standard() -> Result<Self, RegistryError> {
        Ok(Self::new(Arc::new(AssessmentRegistry::standard()?)))
    }

    pub fn with_written_scorer(mut self, scorer: Arc<dyn WrittenResponseScorer>) -> Self {
        self.written = scorer;
        self
    }

    pub fn with_validity_thresholds(mut self, thresholds: ValidityThresholds) -> Self {
        self.validity = ValidityAnalyzer::new(thresholds);
        self
    }

    /// Overrides every type's own recommendation cap.
    pub fn with_recommendation_limit(mut self, limit: usize) -> Self {
        self.recommendation_limit = Some(limit);
        self
    }

    pub fn registry(&self) -> &AssessmentRegistry {
        &self.registry
    }

    fn config(&self, assessment_type: &str) -> Result<Arc<AssessmentTypeConfig>, ScoringError> {
        self.registry
            .get(assessment_type)
            .ok_or_else(|| ScoringError::InvalidAssessmentType(assessment_type.to_string()))
    }

    pub fn score_attempt(
        &self,
        assessment_type: &str,
        responses: &[Response],
    ) -> Result<ScoringResult, ScoringError> {
        let config = self.config(assessment_type)?;

        let dimensions = config.dimension_names();
        let outcome =
            Aggregator::new(&config.items, &dimensions, self.written.as_ref()).aggregate(responses);

        let rules = config.normalization_rules();
        let dimension_scores = Normalizer::new(&rules).normalize_all(&outcome.accumulations);
        let vector = ScoreVector::from_scores(&dimension_scores);
        let overall_score = vector.overall();

        let profile = classify(&config.archetypes, &vector).unwrap_or_else(Profile::unclassified);
        let validity_metrics = self.validity.analyze(responses, &config.items);
        let recommendations = RecommendationRanker::new(&config.candidates).rank(
            &vector,
            overall_score,
            None,
            self.recommendation_limit
                .unwrap_or(config.recommendation_limit),
        );

        debug!(
            assessment_type,
            responses = responses.len(),
            scored = outcome.scored_responses,
            probes = outcome.probe_responses,
            issues = outcome.issues.len(),
            overall_score,
            verdict = validity_metrics.reliability_verdict.label(),
            profile = %profile.archetype_id,
            "scored attempt"
        );

        Ok(ScoringResult {
            assessment_type: config.id.clone(),
            dimension_scores,
            overall_score,
            profile,
            validity_metrics,
            recommendations,
            scored_responses: outcome.scored_responses,
            issues: outcome.issues,
        })
    }

    /// Ranks an arbitrary score vector against a type's candidate table.
    pub fn recommend(
        &self,
        assessment_type: &str,
        scores: &ScoreVector,
        category: Option<CandidateCategory>,
        limit: usize,
    ) -> Result<Vec<RecommendationItem>, ScoringError> {
        let config = self.config(assessment_type)?;
        Ok(RecommendationRanker::new(&config.candidates).rank(
            scores,
            scores.overall(),
            category,
            limit,
        ))
    }
}
