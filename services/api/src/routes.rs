use crate::infra::AppState;
use assessment_engine::error::AppError;
use assessment_engine::scoring::{
    assessment_router, responses_from_csv, sample_responses, AssessmentScoringService,
    AttemptRepository, Response, SampleStyle, ScoringError, ScoringResult,
};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct CsvScoringRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SampleResponse {
    pub(crate) assessment_type: String,
    pub(crate) style: String,
    pub(crate) responses: Vec<Response>,
}

pub(crate) fn with_assessment_routes<R>(service: Arc<AssessmentScoringService<R>>) -> axum::Router
where
    R: AttemptRepository + 'static,
{
    assessment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/assessments/:assessment_type/score-csv",
            axum::routing::post(score_csv_endpoint),
        )
        .route(
            "/api/v1/assessments/:assessment_type/samples/:style",
            axum::routing::get(sample_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores a CSV export without persisting the attempt.
pub(crate) async fn score_csv_endpoint(
    Extension(state): Extension<AppState>,
    Path(assessment_type): Path<String>,
    Json(payload): Json<CsvScoringRequest>,
) -> Result<Json<ScoringResult>, AppError> {
    let reader = Cursor::new(payload.csv.into_bytes());
    let responses = responses_from_csv(reader)?;
    let result = state.engine.score_attempt(&assessment_type, &responses)?;
    Ok(Json(result))
}

pub(crate) async fn sample_endpoint(
    Extension(state): Extension<AppState>,
    Path((assessment_type, style)): Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let config = state
        .engine
        .registry()
        .get(&assessment_type)
        .ok_or_else(|| ScoringError::InvalidAssessmentType(assessment_type.clone()))?;
    let style = match style.parse::<SampleStyle>() {
        Ok(style) => style,
        Err(message) => {
            return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response())
        }
    };

    let body = SampleResponse {
        assessment_type,
        style: style.to_string(),
        responses: sample_responses(&config, style),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessment_engine::scoring::{IssueKind, ReliabilityVerdict, ScoringEngine};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;

    fn state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            engine: Arc::new(ScoringEngine::standard().expect("standard registry")),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn score_csv_endpoint_scores_export() {
        let request = CsvScoringRequest {
            csv: "item_id,kind,value,response_time_ms,timestamp,gesture\n\
ope-1,choice,5,2400,,\n\
con-1,choice,4,3100,,\n\
ext-1,choice,2,2800,,\n"
                .to_string(),
        };

        let Json(result) = score_csv_endpoint(
            Extension(state(true)),
            Path("personality".to_string()),
            Json(request),
        )
        .await
        .expect("csv scores");

        assert_eq!(result.scored_responses, 3);
        assert_eq!(
            result.dimension("openness").expect("openness").scaled_score,
            100.0
        );
        assert_eq!(
            result.validity_metrics.reliability_verdict,
            ReliabilityVerdict::Valid
        );
    }

    #[tokio::test]
    async fn score_csv_endpoint_skips_unreadable_rows() {
        let request = CsvScoringRequest {
            csv: "item_id,kind,value\n\
rank-income,ranking,first\n\
rank-growth,ranking,1/5\n"
                .to_string(),
        };

        let Json(result) = score_csv_endpoint(
            Extension(state(true)),
            Path("career".to_string()),
            Json(request),
        )
        .await
        .expect("remaining rows score");

        assert_eq!(result.scored_responses, 1);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].position, 0);
        assert_eq!(result.issues[0].kind, IssueKind::Malformed);
        assert_eq!(
            result
                .dimension("value_growth")
                .expect("value_growth")
                .scaled_score,
            100.0
        );
    }

    #[tokio::test]
    async fn score_csv_endpoint_rejects_ragged_csv() {
        let request = CsvScoringRequest {
            csv: "item_id,kind,value\nrank-growth,ranking\n".to_string(),
        };

        let err = score_csv_endpoint(
            Extension(state(true)),
            Path("career".to_string()),
            Json(request),
        )
        .await
        .err()
        .expect("ragged row");

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sample_endpoint_returns_not_found_for_unknown_type() {
        let err = sample_endpoint(
            Extension(state(true)),
            Path(("horoscope".to_string(), "balanced".to_string())),
        )
        .await
        .err()
        .expect("unknown type");

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sample_endpoint_generates_one_answer_per_item() {
        let response = sample_endpoint(
            Extension(state(true)),
            Path(("communication".to_string(), "favorable".to_string())),
        )
        .await
        .expect("sample builds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json payload");
        assert_eq!(body["style"], "favorable");

        let engine = ScoringEngine::standard().expect("standard registry");
        let config = engine.registry().get("communication").expect("type");
        assert_eq!(
            body["responses"].as_array().map(Vec::len),
            Some(config.items.len())
        );
    }

    #[tokio::test]
    async fn sample_endpoint_rejects_unknown_style() {
        let response = sample_endpoint(
            Extension(state(true)),
            Path(("career".to_string(), "random".to_string())),
        )
        .await
        .expect("handled");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
