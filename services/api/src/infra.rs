use assessment_engine::config::EngineConfig;
use assessment_engine::error::AppError;
use assessment_engine::scoring::{
    responses_from_csv, AssessmentRegistry, AttemptId, AttemptRecord, AttemptRepository,
    RepositoryError, Response, ScoringEngine,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<ScoringEngine>,
}

#[derive(Default)]
struct AttemptStore {
    records: HashMap<AttemptId, AttemptRecord>,
    order: Vec<AttemptId>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAttemptRepository {
    store: Arc<Mutex<AttemptStore>>,
}

impl AttemptRepository for InMemoryAttemptRepository {
    fn insert(&self, record: AttemptRecord) -> Result<AttemptRecord, RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        if guard.records.contains_key(&record.attempt_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.attempt_id.clone());
        guard
            .records
            .insert(record.attempt_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AttemptId) -> Result<Option<AttemptRecord>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.records.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| guard.records.get(id).cloned())
            .collect())
    }
}

/// Builds the engine from the configured registry, falling back to the built-in types.
pub(crate) fn build_engine(config: &EngineConfig) -> Result<ScoringEngine, AppError> {
    let registry = match &config.registry_path {
        Some(path) => {
            let registry = AssessmentRegistry::from_path(path)?;
            info!(path = %path.display(), types = registry.len(), "loaded assessment registry");
            registry
        }
        None => AssessmentRegistry::standard()?,
    };

    let engine = ScoringEngine::new(Arc::new(registry));
    Ok(match config.recommendation_limit {
        Some(limit) => engine.with_recommendation_limit(limit),
        None => engine,
    })
}

pub(crate) fn load_responses(path: &Path) -> Result<Vec<Response>, AppError> {
    let file = File::open(path)?;
    Ok(responses_from_csv(BufReader::new(file))?)
}
