use serde::{Deserialize, Serialize};

use super::domain::DimensionWeight;
use super::normalization::ScoreVector;

/// Named profile an attempt can be classified into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub name: String,
    pub weights: Vec<DimensionWeight>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
}

impl Archetype {
    /// Weighted sum of the scaled scores the archetype cares about.
    pub fn affinity(&self, scores: &ScoreVector) -> f64 {
        self.weights
            .iter()
            .map(|weight| scores.get(&weight.dimension) * weight.weight)
            .sum()
    }
}

/// Classification outcome attached to a scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub archetype_id: String,
    pub name: String,
    /// Winner's share of the summed affinities, `0.0..=1.0`.
    pub confidence: f64,
    pub strengths: Vec<String>,
    pub challenges: Vec<String>,
}

impl Profile {
    /// Placeholder used when a type declares no archetypes.
    pub fn unclassified() -> Self {
        Self {
            archetype_id: "unclassified".to_string(),
            name: "Unclassified".to_string(),
            confidence: 0.0,
            strengths: Vec::new(),
            challenges: Vec::new(),
        }
    }

    fn from_archetype(archetype: &Archetype, confidence: f64) -> Self {
        Self {
            archetype_id: archetype.id.clone(),
            name: archetype.name.clone(),
            confidence,
            strengths: archetype.strengths.clone(),
            challenges: archetype.challenges.clone(),
        }
    }
}

/// Picks the archetype with the highest affinity. Ties keep the first declared archetype.
pub fn classify(archetypes: &[Archetype], scores: &ScoreVector) -> Option<Profile> {
    let affinities: Vec<f64> = archetypes
        .iter()
        .map(|archetype| archetype.affinity(scores))
        .collect();

    let mut winner: Option<usize> = None;
    for (position, affinity) in affinities.iter().enumerate() {
        match winner {
            Some(best) if *affinity <= affinities[best] => {}
            _ => winner = Some(position),
        }
    }
    let winner = winner?;

    let total: f64 = affinities.iter().sum();
    let confidence = if total > 0.0 {
        ((affinities[winner] / total) * 1_000.0).round() / 1_000.0
    } else {
        0.0
    };

    Some(Profile::from_archetype(&archetypes[winner], confidence))
}
