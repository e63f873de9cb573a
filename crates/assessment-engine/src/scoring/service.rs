use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::Response;
use super::registry::AssessmentTypeSummary;
use super::repository::{
    AttemptId, AttemptRecord, AttemptRepository, AttemptSummaryView, RepositoryError,
};
use super::{ScoringEngine, ScoringError};

/// Service composing the scoring engine with attempt persistence.
pub struct AssessmentScoringService<R> {
    engine: Arc<ScoringEngine>,
    repository: Arc<R>,
}

static ATTEMPT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_attempt_id() -> AttemptId {
    let id = ATTEMPT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AttemptId(format!("att-{id:06}"))
}

impl<R> AssessmentScoringService<R>
where
    R: AttemptRepository + 'static,
{
    pub fn new(engine: Arc<ScoringEngine>, repository: Arc<R>) -> Self {
        Self { engine, repository }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a complete response stream and persist the stream alongside its result.
    pub fn score(
        &self,
        assessment_type: &str,
        responses: Vec<Response>,
    ) -> Result<AttemptRecord, AttemptServiceError> {
        let result = self.engine.score_attempt(assessment_type, &responses)?;

        let record = AttemptRecord {
            attempt_id: next_attempt_id(),
            assessment_type: result.assessment_type.clone(),
            responses,
            result,
            scored_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            attempt_id = %stored.attempt_id,
            assessment_type = %stored.assessment_type,
            verdict = stored.result.validity_metrics.reliability_verdict.label(),
            "attempt scored"
        );
        Ok(stored)
    }

    pub fn get(&self, attempt_id: &AttemptId) -> Result<AttemptRecord, AttemptServiceError> {
        let record = self
            .repository
            .fetch(attempt_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<AttemptSummaryView>, AttemptServiceError> {
        let records = self.repository.recent(limit)?;
        Ok(records.iter().map(AttemptRecord::summary_view).collect())
    }

    pub fn assessment_types(&self) -> Vec<AssessmentTypeSummary> {
        self.engine
            .registry()
            .configs()
            .map(|config| config.summary())
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AttemptServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
