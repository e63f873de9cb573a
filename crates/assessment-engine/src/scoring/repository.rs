use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentTypeId, Response};
use super::validity::ReliabilityVerdict;
use super::ScoringResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub String);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored attempt: the raw stream and its result, kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: AttemptId,
    pub assessment_type: AssessmentTypeId,
    pub responses: Vec<Response>,
    pub result: ScoringResult,
    pub scored_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn summary_view(&self) -> AttemptSummaryView {
        AttemptSummaryView {
            attempt_id: self.attempt_id.clone(),
            assessment_type: self.assessment_type.clone(),
            overall_score: self.result.overall_score,
            profile: self.result.profile.name.clone(),
            reliability_verdict: self.result.validity_metrics.reliability_verdict,
            response_count: self.responses.len(),
            issue_count: self.result.issues.len(),
            scored_at: self.scored_at,
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AttemptRepository: Send + Sync {
    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, RepositoryError>;
    fn fetch(&self, id: &AttemptId) -> Result<Option<AttemptRecord>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Compact listing of a stored attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummaryView {
    pub attempt_id: AttemptId,
    pub assessment_type: AssessmentTypeId,
    pub overall_score: f64,
    pub profile: String,
    pub reliability_verdict: ReliabilityVerdict,
    pub response_count: usize,
    pub issue_count: usize,
    pub scored_at: DateTime<Utc>,
}
