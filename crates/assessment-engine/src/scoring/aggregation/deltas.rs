use super::written::WrittenResponseScorer;
use crate::scoring::domain::{Item, ItemId, ItemKind, ItemScoring, Response, ResponseValue};

/// A response whose payload cannot be scored against its item definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResponseError {
    #[error("item `{item_id}` expects a {expected} response but received {received}")]
    KindMismatch {
        item_id: ItemId,
        expected: ItemKind,
        received: ItemKind,
    },
    #[error("option `{option}` is not defined for item `{item_id}`")]
    UnknownOption { item_id: ItemId, option: String },
    #[error("rank {rank} of {total} is out of range for item `{item_id}`")]
    RankOutOfRange { item_id: ItemId, rank: u32, total: u32 },
    #[error("item `{item_id}` measures elapsed time but the response carries no timing")]
    MissingTiming { item_id: ItemId },
    #[error("item `{item_id}` is keyword scored but the response carries no text")]
    MissingText { item_id: ItemId },
    #[error("response to item `{item_id}` could not be read: {detail}")]
    Unreadable { item_id: ItemId, detail: String },
}

/// Weight contributed by a ranked entry: rank 1 of N is `1.0`, rank N of N is `0.0`.
pub fn ranking_delta(rank: u32, total: u32) -> Option<f64> {
    if rank == 0 || rank > total {
        return None;
    }
    if total == 1 {
        return Some(1.0);
    }

    Some(f64::from(total - rank) / f64::from(total - 1))
}

pub(crate) fn resolve_delta(
    item: &Item,
    response: &Response,
    written: &dyn WrittenResponseScorer,
) -> Result<f64, MalformedResponseError> {
    let received = match &response.value {
        ResponseValue::Unreadable { detail, .. } => {
            return Err(MalformedResponseError::Unreadable {
                item_id: item.id.clone(),
                detail: detail.clone(),
            })
        }
        value => value.kind().unwrap_or(item.kind),
    };
    if received != item.kind {
        return Err(MalformedResponseError::KindMismatch {
            item_id: item.id.clone(),
            expected: item.kind,
            received,
        });
    }

    match (&item.scoring, &response.value) {
        (
            ItemScoring::Options { options },
            ResponseValue::Choice { option } | ResponseValue::Scenario { option },
        ) => options
            .get(option)
            .copied()
            .ok_or_else(|| MalformedResponseError::UnknownOption {
                item_id: item.id.clone(),
                option: option.clone(),
            }),
        (ItemScoring::Rank, ResponseValue::Ranking { rank, total }) => ranking_delta(*rank, *total)
            .ok_or_else(|| MalformedResponseError::RankOutOfRange {
                item_id: item.id.clone(),
                rank: *rank,
                total: *total,
            }),
        (ItemScoring::Keywords { .. }, ResponseValue::Written { text })
        | (
            ItemScoring::Keywords { .. },
            ResponseValue::Simulation {
                text: Some(text), ..
            },
        ) => Ok(written.score(item, text)),
        (ItemScoring::Keywords { .. }, ResponseValue::Simulation { text: None }) => {
            Err(MalformedResponseError::MissingText {
                item_id: item.id.clone(),
            })
        }
        (ItemScoring::Elapsed { curve }, ResponseValue::Simulation { .. }) => response
            .response_time_ms
            .map(|elapsed| curve.delta_for(elapsed))
            .ok_or_else(|| MalformedResponseError::MissingTiming {
                item_id: item.id.clone(),
            }),
        _ => Err(MalformedResponseError::KindMismatch {
            item_id: item.id.clone(),
            expected: item.kind,
            received,
        }),
    }
}
