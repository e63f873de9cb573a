use std::sync::{Arc, Mutex};

use axum::response::Response as HttpResponse;
use serde_json::Value;

use crate::scoring::domain::Response;
use crate::scoring::registry::AssessmentTypeConfig;
use crate::scoring::repository::{AttemptId, AttemptRecord, AttemptRepository, RepositoryError};
use crate::scoring::{assessment_router, AssessmentScoringService, ScoringEngine};

pub(super) const BIG_FIVE_PREFIXES: [&str; 5] = ["ope", "con", "ext", "agr", "emo"];
pub(super) const ASSESSMENT_TYPES: [&str; 3] = ["personality", "career", "communication"];

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard().expect("standard registry loads")
}

pub(super) fn config(engine: &ScoringEngine, assessment_type: &str) -> Arc<AssessmentTypeConfig> {
    engine
        .registry()
        .get(assessment_type)
        .expect("built-in assessment type")
}

/// One Likert answer per Big Five dimension.
pub(super) fn one_answer_per_dimension(option: &str) -> Vec<Response> {
    BIG_FIVE_PREFIXES
        .iter()
        .enumerate()
        .map(|(position, prefix)| {
            Response::choice(format!("{prefix}-1"), option)
                .with_response_time(2_000 + position as u64 * 700)
        })
        .collect()
}

/// Every trait item answered with `option`, with no probes.
pub(super) fn likert_sweep(option: &str) -> Vec<Response> {
    BIG_FIVE_PREFIXES
        .iter()
        .flat_map(|prefix| (1..=3).map(move |position| format!("{prefix}-{position}")))
        .map(|item_id| Response::choice(item_id, option))
        .collect()
}

pub(super) fn build_service() -> (
    AssessmentScoringService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentScoringService::new(Arc::new(engine()), repository.clone());
    (service, repository)
}

pub(super) fn router_with_service(
    service: AssessmentScoringService<MemoryRepository>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<AttemptRecord>>>,
}

impl AttemptRepository for MemoryRepository {
    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.attempt_id == record.attempt_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AttemptId) -> Result<Option<AttemptRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.attempt_id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl AttemptRepository for UnavailableRepository {
    fn insert(&self, _record: AttemptRecord) -> Result<AttemptRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AttemptId) -> Result<Option<AttemptRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AttemptRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: HttpResponse) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
