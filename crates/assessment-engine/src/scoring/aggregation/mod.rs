//! Folds a response stream into raw per-dimension accumulations.
//!
//! Aggregation is a pure function of the stream and the catalog: it never fails as a whole.
//! Responses that cannot be scored are skipped, logged, and reported back as
//! [`ResponseIssue`]s so callers can surface them without invalidating the attempt.

mod deltas;
mod written;

pub use deltas::{ranking_delta, MalformedResponseError};
pub use written::{KeywordScorer, WrittenResponseScorer};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::ItemCatalog;
use super::domain::{Dimension, DimensionAccumulation, ItemId, Response};

/// Why a response (or part of it) did not contribute to dimension scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownItem,
    Malformed,
    UnknownDimension,
}

/// Soft failure recorded for a single response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseIssue {
    pub position: usize,
    pub item_id: ItemId,
    pub kind: IssueKind,
    pub detail: String,
}

/// Aggregation output handed to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// One entry per declared dimension, in declaration order.
    pub accumulations: Vec<DimensionAccumulation>,
    pub issues: Vec<ResponseIssue>,
    pub scored_responses: usize,
    pub probe_responses: usize,
}

pub struct Aggregator<'a> {
    catalog: &'a ItemCatalog,
    dimensions: &'a [Dimension],
    written: &'a dyn WrittenResponseScorer,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        catalog: &'a ItemCatalog,
        dimensions: &'a [Dimension],
        written: &'a dyn WrittenResponseScorer,
    ) -> Self {
        Self {
            catalog,
            dimensions,
            written,
        }
    }

    pub fn aggregate(&self, responses: &[Response]) -> AggregationOutcome {
        let slots: HashMap<&Dimension, usize> = self
            .dimensions
            .iter()
            .enumerate()
            .map(|(slot, dimension)| (dimension, slot))
            .collect();
        let mut accumulations: Vec<DimensionAccumulation> = self
            .dimensions
            .iter()
            .cloned()
            .map(DimensionAccumulation::empty)
            .collect();
        let mut issues = Vec::new();
        let mut scored_responses = 0;
        let mut probe_responses = 0;

        for (position, response) in responses.iter().enumerate() {
            let item = match self.catalog.lookup(&response.item_id) {
                Ok(item) => item,
                Err(err) => {
                    warn!(position, item_id = %response.item_id, "skipping response: {err}");
                    issues.push(ResponseIssue {
                        position,
                        item_id: response.item_id.clone(),
                        kind: IssueKind::UnknownItem,
                        detail: err.to_string(),
                    });
                    continue;
                }
            };

            if item.is_validity_probe() {
                probe_responses += 1;
                continue;
            }

            let delta = match deltas::resolve_delta(item, response, self.written) {
                Ok(delta) => delta,
                Err(err) => {
                    warn!(position, item_id = %item.id, "excluding malformed response: {err}");
                    issues.push(ResponseIssue {
                        position,
                        item_id: item.id.clone(),
                        kind: IssueKind::Malformed,
                        detail: err.to_string(),
                    });
                    continue;
                }
            };

            let mut contributed = false;
            for weight in &item.dimensions {
                match slots.get(&weight.dimension) {
                    Some(slot) => {
                        accumulations[*slot].record(delta, weight.weight);
                        contributed = true;
                    }
                    None => {
                        warn!(
                            position,
                            item_id = %item.id,
                            dimension = %weight.dimension,
                            "ignoring contribution to undeclared dimension"
                        );
                        issues.push(ResponseIssue {
                            position,
                            item_id: item.id.clone(),
                            kind: IssueKind::UnknownDimension,
                            detail: format!("dimension `{}` is not declared", weight.dimension),
                        });
                    }
                }
            }

            if contributed {
                scored_responses += 1;
            }
        }

        AggregationOutcome {
            accumulations,
            issues,
            scored_responses,
            probe_responses,
        }
    }
}
