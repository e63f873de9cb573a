use serde::{Deserialize, Serialize};

/// Penalty points added once the share of one-sided answers exceeds `ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionTier {
    pub ratio: f64,
    pub points: f64,
}

/// Relative weight of each distortion signal in the authenticity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityWeights {
    pub fake_good: f64,
    pub fake_bad: f64,
    pub social_desirability: f64,
    pub speed: f64,
}

impl Default for AuthenticityWeights {
    fn default() -> Self {
        Self {
            fake_good: 0.35,
            fake_bad: 0.35,
            social_desirability: 0.15,
            speed: 0.15,
        }
    }
}

/// Heuristic constants driving the validity analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidityThresholds {
    pub favorable_cutoff: f64,
    pub unfavorable_cutoff: f64,
    /// Only the highest-scoring tier that was exceeded applies.
    pub distortion_tiers: Vec<DistortionTier>,
    pub probe_points: f64,
    pub distortion_flag_at: f64,
    pub consistency_penalty: f64,
    pub consistency_flag_below: f64,
    pub pair_tolerance: f64,
    pub preferred_rank_position: f64,
    pub rejected_rank_position: f64,
    pub desirability_flag_at: f64,
    pub min_desirability_items: usize,
    pub fast_response_ms: u64,
    pub slow_response_ms: u64,
    pub fast_weight: f64,
    pub slow_weight: f64,
    pub speed_flag_at: f64,
    pub alternation_ratio: f64,
    pub uniformity_ratio: f64,
    pub min_pattern_responses: usize,
    pub engagement_flag_below: f64,
    pub authenticity_weights: AuthenticityWeights,
    pub questionable_at: usize,
    pub invalid_at: usize,
}

impl Default for ValidityThresholds {
    fn default() -> Self {
        Self {
            favorable_cutoff: 0.8,
            unfavorable_cutoff: 0.2,
            distortion_tiers: vec![
                DistortionTier {
                    ratio: 0.85,
                    points: 60.0,
                },
                DistortionTier {
                    ratio: 0.75,
                    points: 40.0,
                },
                DistortionTier {
                    ratio: 0.65,
                    points: 20.0,
                },
            ],
            probe_points: 10.0,
            distortion_flag_at: 50.0,
            consistency_penalty: 15.0,
            consistency_flag_below: 70.0,
            pair_tolerance: 0.5,
            preferred_rank_position: 0.75,
            rejected_rank_position: 0.25,
            desirability_flag_at: 80.0,
            min_desirability_items: 2,
            fast_response_ms: 1_000,
            slow_response_ms: 30_000,
            fast_weight: 100.0,
            slow_weight: 60.0,
            speed_flag_at: 30.0,
            alternation_ratio: 0.8,
            uniformity_ratio: 0.85,
            min_pattern_responses: 5,
            engagement_flag_below: 30.0,
            authenticity_weights: AuthenticityWeights::default(),
            questionable_at: 2,
            invalid_at: 4,
        }
    }
}

impl ValidityThresholds {
    pub(crate) fn tier_points(&self, ratio: f64) -> f64 {
        self.distortion_tiers
            .iter()
            .filter(|tier| ratio > tier.ratio)
            .map(|tier| tier.points)
            .fold(0.0, f64::max)
    }
}
