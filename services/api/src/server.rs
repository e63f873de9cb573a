use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, InMemoryAttemptRepository};
use crate::routes::with_assessment_routes;
use assessment_engine::config::AppConfig;
use assessment_engine::error::AppError;
use assessment_engine::scoring::AssessmentScoringService;
use assessment_engine::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(registry) = args.registry.take() {
        config.engine.registry_path = Some(registry);
    }

    telemetry::init(&config.telemetry)?;

    let engine = Arc::new(build_engine(&config.engine)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: engine.clone(),
    };

    let repository = Arc::new(InMemoryAttemptRepository::default());
    let scoring_service = Arc::new(AssessmentScoringService::new(engine.clone(), repository));

    let app = with_assessment_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        assessment_types = engine.registry().len(),
        "assessment engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
