//! Synthetic response streams for demos and calibration runs.

use std::fmt;
use std::str::FromStr;

use super::domain::{Item, ItemKind, ItemScoring, Response, ResponseValue};
use super::registry::AssessmentTypeConfig;

const BASE_RESPONSE_MS: u64 = 2_000;
const RESPONSE_STEP_MS: u64 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStyle {
    /// Mid-scale answers everywhere; ranked values take distinct ranks in catalog order.
    Balanced,
    /// The most flattering answer to every item, probes included.
    Favorable,
}

impl SampleStyle {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Favorable => "favorable",
        }
    }
}

impl fmt::Display for SampleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SampleStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "balanced" | "neutral" => Ok(Self::Balanced),
            "favorable" | "favourable" | "extreme" => Ok(Self::Favorable),
            other => Err(format!("unknown sample style `{other}`")),
        }
    }
}

/// One response per catalog item, in catalog order.
pub fn sample_responses(config: &AssessmentTypeConfig, style: SampleStyle) -> Vec<Response> {
    let ranked = config
        .items
        .items()
        .iter()
        .filter(|item| matches!(item.scoring, ItemScoring::Rank))
        .count() as u32;

    let mut rank_slot = 0;
    config
        .items
        .items()
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let pacing = BASE_RESPONSE_MS + (position as u64 % 5) * RESPONSE_STEP_MS;
            if matches!(item.scoring, ItemScoring::Rank) {
                rank_slot += 1;
            }
            sample_response(item, style, (rank_slot, ranked), pacing)
        })
        .collect()
}

/// `ranking` is the item's slot among ranked items and the number of ranked items.
fn sample_response(
    item: &Item,
    style: SampleStyle,
    ranking: (u32, u32),
    pacing: u64,
) -> Option<Response> {
    let value = match &item.scoring {
        ItemScoring::Options { options } => {
            let option = match style {
                SampleStyle::Favorable => item.most_favorable_option()?.to_string(),
                SampleStyle::Balanced => {
                    let mut by_delta: Vec<(&String, &f64)> = options.iter().collect();
                    by_delta.sort_by(|left, right| left.1.total_cmp(right.1));
                    by_delta.get(by_delta.len() / 2)?.0.clone()
                }
            };
            match item.kind {
                ItemKind::Scenario => ResponseValue::Scenario { option },
                _ => ResponseValue::Choice { option },
            }
        }
        ItemScoring::Rank => {
            let (slot, ranked) = ranking;
            let total = ranked.max(1);
            let rank = match style {
                SampleStyle::Favorable => 1,
                SampleStyle::Balanced => slot.clamp(1, total),
            };
            ResponseValue::Ranking { rank, total }
        }
        ItemScoring::Keywords { table } => {
            let keep = match style {
                SampleStyle::Favorable => table.terms.len(),
                SampleStyle::Balanced => table.terms.len() / 2,
            };
            let text = table
                .terms
                .keys()
                .take(keep)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            match item.kind {
                ItemKind::Simulation => ResponseValue::Simulation { text: Some(text) },
                _ => ResponseValue::Written { text },
            }
        }
        ItemScoring::Elapsed { curve } => {
            let elapsed = match style {
                SampleStyle::Favorable => curve.fast_ms,
                SampleStyle::Balanced => (curve.fast_ms + curve.slow_ms) / 2,
            };
            return Some(
                Response::new(item.id.as_str(), ResponseValue::Simulation { text: None })
                    .with_response_time(elapsed),
            );
        }
    };

    Some(Response::new(item.id.as_str(), value).with_response_time(pacing))
}
