use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{lenient_responses, Response};
use super::repository::{AttemptId, AttemptRepository, RepositoryError};
use super::service::{AssessmentScoringService, AttemptServiceError};
use super::ScoringError;

/// Attempt submission body. Answers with an unreadable payload stay in the stream and are
/// reported as issues on the result.
#[derive(Debug, Deserialize)]
pub struct AttemptSubmission {
    #[serde(default, deserialize_with = "lenient_responses")]
    pub responses: Vec<Response>,
}

const RECENT_ATTEMPTS_LIMIT: usize = 20;

/// Router builder exposing scoring, attempt lookup, and the assessment catalog.
pub fn assessment_router<R>(service: Arc<AssessmentScoringService<R>>) -> Router
where
    R: AttemptRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments", get(catalog_handler::<R>))
        .route(
            "/api/v1/assessments/:assessment_type/attempts",
            post(score_handler::<R>),
        )
        .route("/api/v1/attempts", get(recent_handler::<R>))
        .route("/api/v1/attempts/:attempt_id", get(attempt_handler::<R>))
        .with_state(service)
}

pub(crate) async fn catalog_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
) -> HttpResponse
where
    R: AttemptRepository + 'static,
{
    let types = service.assessment_types();
    (StatusCode::OK, Json(json!({ "assessment_types": types }))).into_response()
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(assessment_type): Path<String>,
    Json(submission): Json<AttemptSubmission>,
) -> HttpResponse
where
    R: AttemptRepository + 'static,
{
    match service.score(&assessment_type, submission.responses) {
        Ok(record) => {
            let payload = json!({
                "attempt_id": record.attempt_id,
                "scored_at": record.scored_at,
                "result": record.result,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(AttemptServiceError::Scoring(ScoringError::InvalidAssessmentType(requested))) => {
            let payload = json!({
                "error": format!("unknown assessment type `{requested}`"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(AttemptServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "attempt already exists",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn attempt_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
    Path(attempt_id): Path<String>,
) -> HttpResponse
where
    R: AttemptRepository + 'static,
{
    let id = AttemptId(attempt_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(AttemptServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "attempt_id": id,
                "error": "attempt not found",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn recent_handler<R>(
    State(service): State<Arc<AssessmentScoringService<R>>>,
) -> HttpResponse
where
    R: AttemptRepository + 'static,
{
    match service.recent(RECENT_ATTEMPTS_LIMIT) {
        Ok(attempts) => (StatusCode::OK, Json(json!({ "attempts": attempts }))).into_response(),
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
