use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::triage::domain::{AGE, SPO2};
use crate::workflows::triage::scorer::LogisticModel;
use crate::workflows::triage::{
    MissingFeaturePolicy, ModelArtifact, RecommendationMode, RecommendationResolver, RuleEngine,
    RuleRegistry, Scorer, TriageConfig, TriageService,
};

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < TOLERANCE
}

pub(super) fn registry() -> Arc<RuleRegistry> {
    Arc::new(RuleRegistry::standard().expect("standard tables are valid"))
}

pub(super) fn engine() -> RuleEngine {
    RuleEngine::new(registry())
}

pub(super) fn resolver(mode: RecommendationMode) -> RecommendationResolver {
    RecommendationResolver::new(registry(), mode, 0.5)
}

/// Logistic model over SpO2 and age that ignores its inputs and always
/// returns `probability`.
pub(super) fn constant_model(probability: f64) -> ModelArtifact {
    ModelArtifact::LogisticRegression(LogisticModel {
        feature_names: vec![SPO2.to_string(), AGE.to_string()],
        coefficients: vec![0.0, 0.0],
        intercept: (probability / (1.0 - probability)).ln(),
    })
}

pub(super) fn constant_scorer(probability: f64) -> Arc<Scorer> {
    Arc::new(
        Scorer::from_parts(constant_model(probability), None, MissingFeaturePolicy::Reject)
            .expect("constant model is consistent"),
    )
}

pub(super) fn service_with(probability: Option<f64>, config: TriageConfig) -> TriageService {
    TriageService::new(
        registry(),
        config,
        probability.map(constant_scorer),
        PathBuf::from("model/er_model.json"),
    )
    .expect("valid configuration")
}

pub(super) fn service(probability: f64) -> TriageService {
    service_with(Some(probability), TriageConfig::default())
}

pub(super) fn service_without_model() -> TriageService {
    service_with(None, TriageConfig::default())
}

/// Writes `contents` to a per-test file under the system temp directory.
pub(super) fn write_artifact(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "triage-ai-{}-{name}.json",
        std::process::id()
    ));
    fs::write(&path, contents).expect("temp artifact is writable");
    path
}

pub(super) async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
