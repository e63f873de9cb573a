//! Response-validity assessment computed from the raw response stream.
//!
//! The analyzer is independent of dimension scores: a flawless profile is exactly the pattern
//! it must be able to flag. It never fails; responses with unknown items or missing timing
//! simply drop out of the heuristics that need them.

mod config;
mod indicators;

pub use config::{AuthenticityWeights, DistortionTier, ValidityThresholds};

use serde::{Deserialize, Serialize};

use super::catalog::ItemCatalog;
use super::domain::{Response, ValidityKind};
use super::normalization::round_tenth;

/// Overall trust verdict for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityVerdict {
    Valid,
    Questionable,
    Invalid,
}

impl ReliabilityVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Questionable => "questionable",
            Self::Invalid => "invalid",
        }
    }
}

/// Individual heuristics counted toward the reliability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionIndicator {
    InconsistentResponding,
    FakeGood,
    FakeBad,
    ProbeEndorsement,
    SocialDesirability,
    SpeedAnomaly,
    AlternatingPattern,
    UniformPattern,
    LowEngagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityMetrics {
    pub consistency: f64,
    pub fake_good_index: f64,
    pub fake_bad_index: f64,
    pub social_desirability_bias: f64,
    pub speed_flag_score: f64,
    pub pattern_flag: bool,
    pub engagement_level: f64,
    pub authenticity_score: f64,
    pub reliability_verdict: ReliabilityVerdict,
    #[serde(default)]
    pub triggered_indicators: Vec<DistortionIndicator>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidityAnalyzer {
    thresholds: ValidityThresholds,
}

impl ValidityAnalyzer {
    pub fn new(thresholds: ValidityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ValidityThresholds {
        &self.thresholds
    }

    /// Recomputes every metric from the complete stream.
    pub fn analyze(&self, responses: &[Response], catalog: &ItemCatalog) -> ValidityMetrics {
        let thresholds = &self.thresholds;
        let observations = indicators::observe(responses, catalog, thresholds);

        let (consistency, _) = indicators::consistency(&observations, thresholds);

        let fake_good_probes = indicators::probe_tally(&observations, thresholds, |kind| {
            matches!(kind, ValidityKind::FakeGood)
        });
        let fake_bad_probes = indicators::probe_tally(&observations, thresholds, |kind| {
            matches!(kind, ValidityKind::FakeBad)
        });
        let desirability_probes = indicators::probe_tally(&observations, thresholds, |kind| {
            matches!(kind, ValidityKind::SocialDesirability)
        });

        let (favorable_ratio, unfavorable_ratio) = indicators::answer_skew(&observations);
        let fake_good_index =
            indicators::distortion_index(favorable_ratio, fake_good_probes.endorsed, thresholds);
        let fake_bad_index =
            indicators::distortion_index(unfavorable_ratio, fake_bad_probes.endorsed, thresholds);
        let social_desirability_bias = desirability_probes.endorsement_ratio() * 100.0;

        let speed_flag_score = indicators::speed_flag_score(&observations, thresholds);
        let pattern = indicators::response_pattern(&observations, thresholds);
        let engagement_level = indicators::engagement(&observations, catalog);

        let weights = &thresholds.authenticity_weights;
        let distortion = weights.fake_good * fake_good_index
            + weights.fake_bad * fake_bad_index
            + weights.social_desirability * social_desirability_bias
            + weights.speed * speed_flag_score;
        let authenticity_score = (100.0 - distortion).clamp(0.0, 100.0);

        let distortion_probes = indicators::ProbeTally {
            answered: fake_good_probes.answered + fake_bad_probes.answered,
            endorsed: fake_good_probes.endorsed + fake_bad_probes.endorsed,
        };

        let mut triggered = Vec::new();
        if consistency < thresholds.consistency_flag_below {
            triggered.push(DistortionIndicator::InconsistentResponding);
        }
        if fake_good_index >= thresholds.distortion_flag_at {
            triggered.push(DistortionIndicator::FakeGood);
        }
        if fake_bad_index >= thresholds.distortion_flag_at {
            triggered.push(DistortionIndicator::FakeBad);
        }
        if distortion_probes.answered > 0
            && distortion_probes.endorsed * 2 >= distortion_probes.answered
        {
            triggered.push(DistortionIndicator::ProbeEndorsement);
        }
        if desirability_probes.answered >= thresholds.min_desirability_items
            && social_desirability_bias >= thresholds.desirability_flag_at
        {
            triggered.push(DistortionIndicator::SocialDesirability);
        }
        if speed_flag_score >= thresholds.speed_flag_at {
            triggered.push(DistortionIndicator::SpeedAnomaly);
        }
        if pattern.alternating {
            triggered.push(DistortionIndicator::AlternatingPattern);
        }
        if pattern.uniform {
            triggered.push(DistortionIndicator::UniformPattern);
        }
        if !responses.is_empty() && engagement_level < thresholds.engagement_flag_below {
            triggered.push(DistortionIndicator::LowEngagement);
        }

        let reliability_verdict = if triggered.len() >= thresholds.invalid_at {
            ReliabilityVerdict::Invalid
        } else if triggered.len() >= thresholds.questionable_at {
            ReliabilityVerdict::Questionable
        } else {
            ReliabilityVerdict::Valid
        };

        ValidityMetrics {
            consistency: round_tenth(consistency),
            fake_good_index: round_tenth(fake_good_index),
            fake_bad_index: round_tenth(fake_bad_index),
            social_desirability_bias: round_tenth(social_desirability_bias),
            speed_flag_score: round_tenth(speed_flag_score),
            pattern_flag: pattern.alternating || pattern.uniform,
            engagement_level: round_tenth(engagement_level),
            authenticity_score: round_tenth(authenticity_score),
            reliability_verdict,
            triggered_indicators: triggered,
        }
    }
}
