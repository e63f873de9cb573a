use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::config::ValidityThresholds;
use crate::scoring::aggregation::ranking_delta;
use crate::scoring::catalog::ItemCatalog;
use crate::scoring::domain::{
    Dimension, Item, ItemId, ItemKind, Response, ResponseValue, ValidityKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Valence {
    Favorable,
    Neutral,
    Unfavorable,
}

/// A response joined with its catalog entry and its position inside the option range.
pub(crate) struct Observation<'a> {
    pub(crate) response: &'a Response,
    pub(crate) item: Option<&'a Item>,
    pub(crate) relative: Option<f64>,
    pub(crate) valence: Option<Valence>,
}

impl<'a> Observation<'a> {
    fn probe(&self) -> Option<&'a ValidityKind> {
        self.item.and_then(|item| item.validity.as_ref())
    }

    /// Trait-measuring choice or scenario answer that resolved against its option table.
    fn is_measured_option(&self) -> bool {
        match self.item {
            Some(item) => {
                !item.is_validity_probe()
                    && matches!(item.kind, ItemKind::Choice | ItemKind::Scenario)
                    && self.relative.is_some()
            }
            None => false,
        }
    }
}

pub(crate) fn observe<'a>(
    responses: &'a [Response],
    catalog: &'a ItemCatalog,
    thresholds: &ValidityThresholds,
) -> Vec<Observation<'a>> {
    responses
        .iter()
        .map(|response| {
            let item = catalog.lookup(&response.item_id).ok();
            let relative = item
                .filter(|item| response.value.kind() == Some(item.kind))
                .and_then(|item| match &response.value {
                    ResponseValue::Choice { option } | ResponseValue::Scenario { option } => {
                        item.relative_position(option)
                    }
                    ResponseValue::Ranking { rank, total } => ranking_delta(*rank, *total),
                    _ => None,
                });
            let valence = relative.map(|position| {
                if position >= thresholds.favorable_cutoff {
                    Valence::Favorable
                } else if position <= thresholds.unfavorable_cutoff {
                    Valence::Unfavorable
                } else {
                    Valence::Neutral
                }
            });

            Observation {
                response,
                item,
                relative,
                valence,
            }
        })
        .collect()
}

/// Consistency score and number of disagreements found.
///
/// Two ranked items claiming the same rank count as a disagreement, as do option answers that
/// contradict the ranked priorities and repeated items answered differently.
pub(crate) fn consistency(
    observations: &[Observation<'_>],
    thresholds: &ValidityThresholds,
) -> (f64, usize) {
    let mut disagreements = 0;
    let mut rank_positions: BTreeMap<&Dimension, (f64, u32)> = BTreeMap::new();
    let mut claimed_ranks: HashMap<(u32, u32), &ItemId> = HashMap::new();
    for observation in observations {
        let (Some(item), Some(relative)) = (observation.item, observation.relative) else {
            continue;
        };
        if item.kind != ItemKind::Ranking || item.is_validity_probe() {
            continue;
        }
        if let ResponseValue::Ranking { rank, total } = &observation.response.value {
            match claimed_ranks.entry((*rank, *total)) {
                Entry::Occupied(holder) => {
                    if *holder.get() != &item.id {
                        disagreements += 1;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(&item.id);
                }
            }
        }
        for weight in &item.dimensions {
            let entry = rank_positions.entry(&weight.dimension).or_insert((0.0, 0));
            entry.0 += relative;
            entry.1 += 1;
        }
    }

    let mut preferred = BTreeSet::new();
    let mut rejected = BTreeSet::new();
    for (dimension, (sum, count)) in rank_positions {
        let mean = sum / f64::from(count);
        if mean >= thresholds.preferred_rank_position {
            preferred.insert(dimension);
        } else if mean <= thresholds.rejected_rank_position {
            rejected.insert(dimension);
        }
    }

    let mut latest: HashMap<&ItemId, f64> = HashMap::new();

    for observation in observations.iter().filter(|obs| obs.is_measured_option()) {
        let (Some(item), Some(valence), Some(relative)) =
            (observation.item, observation.valence, observation.relative)
        else {
            continue;
        };
        latest.insert(&item.id, relative);

        let contradicts = item.dimensions.iter().any(|weight| {
            (preferred.contains(&weight.dimension) && valence == Valence::Unfavorable)
                || (rejected.contains(&weight.dimension) && valence == Valence::Favorable)
        });
        if contradicts {
            disagreements += 1;
        }
    }

    for observation in observations {
        let Some(ValidityKind::Inconsistency {
            paired_with,
            reversed,
        }) = observation.probe()
        else {
            continue;
        };
        let (Some(relative), Some(paired)) = (observation.relative, latest.get(paired_with))
        else {
            continue;
        };

        let expected = if *reversed { 1.0 - paired } else { *paired };
        if (relative - expected).abs() > thresholds.pair_tolerance {
            disagreements += 1;
        }
    }

    let score = (100.0 - thresholds.consistency_penalty * disagreements as f64).max(0.0);
    (score, disagreements)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ProbeTally {
    pub(crate) answered: usize,
    pub(crate) endorsed: usize,
}

impl ProbeTally {
    pub(crate) fn endorsement_ratio(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.endorsed as f64 / self.answered as f64
        }
    }
}

pub(crate) fn probe_tally(
    observations: &[Observation<'_>],
    thresholds: &ValidityThresholds,
    matches_kind: impl Fn(&ValidityKind) -> bool,
) -> ProbeTally {
    observations
        .iter()
        .filter(|observation| observation.probe().is_some_and(&matches_kind))
        .filter_map(|observation| observation.relative)
        .fold(ProbeTally::default(), |mut tally, relative| {
            tally.answered += 1;
            if relative >= thresholds.favorable_cutoff {
                tally.endorsed += 1;
            }
            tally
        })
}

/// Share of favourable and unfavourable answers among measured option answers.
pub(crate) fn answer_skew(observations: &[Observation<'_>]) -> (f64, f64) {
    let mut favorable = 0usize;
    let mut unfavorable = 0usize;
    let mut total = 0usize;

    for observation in observations.iter().filter(|obs| obs.is_measured_option()) {
        total += 1;
        match observation.valence {
            Some(Valence::Favorable) => favorable += 1,
            Some(Valence::Unfavorable) => unfavorable += 1,
            _ => {}
        }
    }

    if total == 0 {
        return (0.0, 0.0);
    }

    (
        favorable as f64 / total as f64,
        unfavorable as f64 / total as f64,
    )
}

pub(crate) fn distortion_index(
    ratio: f64,
    endorsed_probes: usize,
    thresholds: &ValidityThresholds,
) -> f64 {
    let points = thresholds.tier_points(ratio) + thresholds.probe_points * endorsed_probes as f64;
    points.clamp(0.0, 100.0)
}

/// Responses without timing are excluded rather than treated as fast or slow.
pub(crate) fn speed_flag_score(
    observations: &[Observation<'_>],
    thresholds: &ValidityThresholds,
) -> f64 {
    let timings: Vec<u64> = observations
        .iter()
        .filter_map(|observation| observation.response.response_time_ms)
        .collect();
    if timings.is_empty() {
        return 0.0;
    }

    let total = timings.len() as f64;
    let fast = timings
        .iter()
        .filter(|millis| **millis < thresholds.fast_response_ms)
        .count() as f64;
    let slow = timings
        .iter()
        .filter(|millis| **millis > thresholds.slow_response_ms)
        .count() as f64;

    let score = (fast / total) * thresholds.fast_weight + (slow / total) * thresholds.slow_weight;
    score.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PatternFindings {
    pub(crate) alternation: f64,
    pub(crate) uniformity: f64,
    pub(crate) alternating: bool,
    pub(crate) uniform: bool,
}

pub(crate) fn response_pattern(
    observations: &[Observation<'_>],
    thresholds: &ValidityThresholds,
) -> PatternFindings {
    let measured: Vec<&Observation<'_>> = observations
        .iter()
        .filter(|observation| observation.is_measured_option())
        .collect();

    let polar: Vec<Valence> = measured
        .iter()
        .filter_map(|observation| observation.valence)
        .filter(|valence| *valence != Valence::Neutral)
        .collect();
    let alternation = if polar.len() >= thresholds.min_pattern_responses {
        let switches = polar.windows(2).filter(|pair| pair[0] != pair[1]).count();
        switches as f64 / (polar.len() - 1) as f64
    } else {
        0.0
    };

    // same scale point across differently labelled option tables
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for relative in measured.iter().filter_map(|observation| observation.relative) {
        *counts.entry(scale_point(relative)).or_default() += 1;
    }
    let answered: usize = counts.values().sum();
    let uniformity = if answered >= thresholds.min_pattern_responses {
        counts.values().copied().max().unwrap_or(0) as f64 / answered as f64
    } else {
        0.0
    };

    PatternFindings {
        alternation,
        uniformity,
        alternating: alternation > thresholds.alternation_ratio,
        uniform: uniformity > thresholds.uniformity_ratio,
    }
}

fn scale_point(relative: f64) -> u32 {
    (relative.clamp(0.0, 1.0) * 100.0).round() as u32
}

const TIMING_SHARE: f64 = 40.0;
const DIVERSITY_SHARE: f64 = 30.0;
const RICHNESS_SHARE: f64 = 30.0;

pub(crate) fn engagement(observations: &[Observation<'_>], catalog: &ItemCatalog) -> f64 {
    let timings: Vec<f64> = observations
        .iter()
        .filter_map(|observation| observation.response.response_time_ms)
        .map(|millis| millis as f64)
        .collect();
    let timing = timing_variability_points(&timings);

    let available = catalog.measured_kinds();
    let used: BTreeSet<ItemKind> = observations
        .iter()
        .filter_map(|observation| observation.item)
        .filter(|item| !item.is_validity_probe())
        .map(|item| item.kind)
        .collect();
    let diversity = if available.is_empty() {
        0.0
    } else {
        DIVERSITY_SHARE * used.len() as f64 / available.len() as f64
    };

    let richness = if observations.is_empty() {
        0.0
    } else {
        let rich = observations
            .iter()
            .filter(|observation| observation.response.interaction.is_some())
            .count();
        RICHNESS_SHARE * rich as f64 / observations.len() as f64
    };

    (timing + diversity + richness).clamp(0.0, 100.0)
}

/// Moderate variation in response time earns full credit; flat or erratic timing earns less.
fn timing_variability_points(timings: &[f64]) -> f64 {
    if timings.len() < 2 {
        return TIMING_SHARE / 2.0;
    }

    let mean = timings.iter().sum::<f64>() / timings.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = timings
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / timings.len() as f64;
    let cv = variance.sqrt() / mean;

    if cv < 0.15 {
        TIMING_SHARE * cv / 0.15
    } else if cv <= 1.0 {
        TIMING_SHARE
    } else {
        TIMING_SHARE * (2.0 - cv).max(0.0)
    }
}
