//! Maps raw accumulations onto a shared 0–100 scale.
//!
//! Percentiles reported here come from a fixed step table so results are reproducible across
//! runs and deployments. They are buckets, not percentiles of any observed population.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Dimension, DimensionAccumulation, DimensionScore, ScoreLevel};

/// Score assigned to dimensions with no usable answers.
pub const NEUTRAL_SCORE: f64 = 50.0;

const PERCENTILE_STEPS: [(f64, u8); 7] = [
    (95.0, 99),
    (85.0, 90),
    (75.0, 80),
    (65.0, 70),
    (55.0, 60),
    (45.0, 50),
    (35.0, 35),
];
const FLOOR_PERCENTILE: u8 = 5;

/// Native range of a dimension's raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "scale", rename_all = "snake_case")]
pub enum NormalizationRule {
    /// Raw scores are already expressed on 0–100 (Likert-style tables).
    #[default]
    Percent,
    /// Symmetric `-bound..=bound` scale, e.g. swipe dimensions scored -5..+5.
    Symmetric { bound: f64 },
    /// Bounded categorical range.
    Bounded { min: f64, max: f64 },
}

impl NormalizationRule {
    pub fn scale(&self, raw: f64) -> f64 {
        let scaled = match *self {
            Self::Percent => raw,
            Self::Symmetric { bound } if bound > 0.0 => ((raw + bound) / (2.0 * bound)) * 100.0,
            Self::Bounded { min, max } if max > min => ((raw - min) / (max - min)) * 100.0,
            Self::Symmetric { .. } | Self::Bounded { .. } => NEUTRAL_SCORE,
        };

        if scaled.is_finite() {
            scaled.clamp(0.0, 100.0)
        } else {
            NEUTRAL_SCORE
        }
    }
}

pub fn percentile_bucket(scaled: f64) -> u8 {
    PERCENTILE_STEPS
        .iter()
        .find(|(floor, _)| scaled >= *floor)
        .map(|(_, percentile)| *percentile)
        .unwrap_or(FLOOR_PERCENTILE)
}

pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct Normalizer<'a> {
    rules: &'a BTreeMap<Dimension, NormalizationRule>,
}

impl<'a> Normalizer<'a> {
    pub fn new(rules: &'a BTreeMap<Dimension, NormalizationRule>) -> Self {
        Self { rules }
    }

    pub fn normalize(&self, accumulation: &DimensionAccumulation) -> DimensionScore {
        if accumulation.sample_count == 0 {
            return neutral_score(accumulation.dimension.clone());
        }

        let raw = accumulation.raw_sum / f64::from(accumulation.sample_count.max(1));
        let rule = self
            .rules
            .get(&accumulation.dimension)
            .copied()
            .unwrap_or_default();
        let scaled = round_tenth(rule.scale(raw));

        DimensionScore {
            dimension: accumulation.dimension.clone(),
            raw_score: Some(raw),
            scaled_score: scaled,
            percentile: percentile_bucket(scaled),
            level: ScoreLevel::from_score(scaled),
            sample_count: accumulation.sample_count,
        }
    }

    pub fn normalize_all(&self, accumulations: &[DimensionAccumulation]) -> Vec<DimensionScore> {
        accumulations
            .iter()
            .map(|accumulation| self.normalize(accumulation))
            .collect()
    }
}

pub fn neutral_score(dimension: Dimension) -> DimensionScore {
    DimensionScore {
        dimension,
        raw_score: None,
        scaled_score: NEUTRAL_SCORE,
        percentile: percentile_bucket(NEUTRAL_SCORE),
        level: ScoreLevel::from_score(NEUTRAL_SCORE),
        sample_count: 0,
    }
}

/// Dimension → scaled score lookup consumed by the classifier and ranker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVector {
    scores: BTreeMap<Dimension, f64>,
}

impl ScoreVector {
    pub fn from_scores(scores: &[DimensionScore]) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|score| (score.dimension.clone(), score.scaled_score))
                .collect(),
        }
    }

    /// Scaled score for `dimension`, neutral when the vector does not carry it.
    pub fn get(&self, dimension: &Dimension) -> f64 {
        self.scores
            .get(dimension)
            .copied()
            .unwrap_or(NEUTRAL_SCORE)
    }

    pub fn contains(&self, dimension: &Dimension) -> bool {
        self.scores.contains_key(dimension)
    }

    /// Mean scaled score across the vector, neutral when empty.
    pub fn overall(&self) -> f64 {
        if self.scores.is_empty() {
            return NEUTRAL_SCORE;
        }
        let total: f64 = self.scores.values().sum();
        round_tenth(total / self.scores.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulation(dimension: &str, raw_sum: f64, sample_count: u32) -> DimensionAccumulation {
        DimensionAccumulation {
            dimension: Dimension::new(dimension),
            raw_sum,
            sample_count,
        }
    }

    #[test]
    fn symmetric_scale_maps_swipe_range_onto_percent() {
        let rule = NormalizationRule::Symmetric { bound: 5.0 };
        assert_eq!(rule.scale(-5.0), 0.0);
        assert_eq!(rule.scale(0.0), 50.0);
        assert_eq!(rule.scale(5.0), 100.0);
        assert_eq!(rule.scale(9.0), 100.0);
    }

    #[test]
    fn bounded_scale_uses_declared_range() {
        let rule = NormalizationRule::Bounded { min: 0.0, max: 1.0 };
        assert_eq!(rule.scale(0.25), 25.0);
        assert_eq!(rule.scale(-3.0), 0.0);

        let degenerate = NormalizationRule::Bounded { min: 2.0, max: 2.0 };
        assert_eq!(degenerate.scale(2.0), NEUTRAL_SCORE);
    }

    #[test]
    fn out_of_range_percent_input_is_clamped() {
        let rules = BTreeMap::new();
        let normalizer = Normalizer::new(&rules);

        let high = normalizer.normalize(&accumulation("openness", 480.0, 2));
        assert_eq!(high.scaled_score, 100.0);
        assert_eq!(high.raw_score, Some(240.0));

        let low = normalizer.normalize(&accumulation("openness", -30.0, 1));
        assert_eq!(low.scaled_score, 0.0);
        assert_eq!(low.level, ScoreLevel::Developing);
    }

    #[test]
    fn empty_dimensions_default_to_neutral() {
        let rules = BTreeMap::new();
        let score = Normalizer::new(&rules).normalize(&accumulation("empathy", 0.0, 0));

        assert_eq!(score.scaled_score, NEUTRAL_SCORE);
        assert_eq!(score.raw_score, None);
        assert_eq!(score.level, ScoreLevel::Average);
        assert_eq!(score.percentile, 50);
    }

    #[test]
    fn percentile_steps_are_monotonic() {
        assert_eq!(percentile_bucket(100.0), 99);
        assert_eq!(percentile_bucket(95.0), 99);
        assert_eq!(percentile_bucket(90.0), 90);
        assert_eq!(percentile_bucket(60.0), 60);
        assert_eq!(percentile_bucket(34.9), 5);

        let mut previous = 0;
        for step in 0..=100 {
            let bucket = percentile_bucket(f64::from(step));
            assert!(bucket >= previous);
            previous = bucket;
        }
    }

    #[test]
    fn levels_follow_threshold_table() {
        assert_eq!(ScoreLevel::from_score(90.0), ScoreLevel::Exceptional);
        assert_eq!(ScoreLevel::from_score(75.0), ScoreLevel::Strong);
        assert_eq!(ScoreLevel::from_score(60.0), ScoreLevel::AboveAverage);
        assert_eq!(ScoreLevel::from_score(40.0), ScoreLevel::Average);
        assert_eq!(ScoreLevel::from_score(25.0), ScoreLevel::BelowAverage);
        assert_eq!(ScoreLevel::from_score(24.9), ScoreLevel::Developing);
    }
}
