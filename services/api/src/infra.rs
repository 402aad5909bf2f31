use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};
use triage_ai::config::AppConfig;
use triage_ai::error::AppError;
use triage_ai::workflows::triage::{RuleRegistry, Scorer, TriageError, TriageService};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) model_loaded: bool,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the model artifact, treating an absent file as "no model".
/// A present but unusable artifact is an error.
pub(crate) fn load_scorer(config: &AppConfig) -> Result<Option<Arc<Scorer>>, TriageError> {
    match Scorer::load(&config.artifacts, config.triage.missing_features) {
        Ok(scorer) => Ok(Some(Arc::new(scorer))),
        Err(TriageError::ArtifactNotFound { path }) => {
            warn!(
                path = %path.display(),
                "model artifact missing; only safety overrides can be served"
            );
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

pub(crate) fn build_service(config: &AppConfig) -> Result<TriageService, AppError> {
    let registry = Arc::new(RuleRegistry::standard()?);
    let scorer = load_scorer(config)?;
    let service = TriageService::new(
        registry.clone(),
        config.triage.clone(),
        scorer,
        config.artifacts.model_path.clone(),
    )?;

    info!(
        rules = registry.rules().len(),
        recommendations = registry.recommendations().len(),
        model_loaded = service.model_loaded(),
        "triage service assembled"
    );
    Ok(service)
}
