//! End-to-end triage scenarios driven through the public service facade and
//! HTTP router, using model artifacts written to disk the way deployments
//! ship them.

mod common {
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;

    use triage_ai::workflows::triage::{
        ArtifactConfig, MissingFeaturePolicy, RuleRegistry, Scorer, TriageConfig, TriageService,
        TRAINED_FEATURE_ORDER,
    };

    /// Logistic artifact over the full trained feature order, leaning on the
    /// vitals a clinician would expect to matter.
    pub(super) fn model_json() -> String {
        let coefficients: Vec<f64> = TRAINED_FEATURE_ORDER
            .iter()
            .map(|name| match *name {
                "SpO2" => -0.12,
                "chest_pain" => 0.9,
                "age" => 0.02,
                "respiratory_rate" => 0.05,
                _ => 0.0,
            })
            .collect();
        serde_json::json!({
            "kind": "logistic_regression",
            "feature_names": TRAINED_FEATURE_ORDER,
            "coefficients": coefficients,
            "intercept": 8.5,
        })
        .to_string()
    }

    pub(super) fn model_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "triage-ai-it-{}-{name}.json",
            std::process::id()
        ));
        fs::write(&path, model_json()).expect("temp model is writable");
        path
    }

    pub(super) fn service(name: &str, config: TriageConfig) -> TriageService {
        let artifacts = ArtifactConfig {
            model_path: model_path(name),
            scaler_path: None,
        };
        let scorer = Scorer::load(&artifacts, config.missing_features).expect("model loads");
        TriageService::new(
            Arc::new(RuleRegistry::standard().expect("standard tables")),
            config,
            Some(Arc::new(scorer)),
            artifacts.model_path,
        )
        .expect("service builds")
    }

    pub(super) fn zero_fill() -> TriageConfig {
        TriageConfig {
            missing_features: MissingFeaturePolicy::ZeroFill,
            ..TriageConfig::default()
        }
    }
}

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use triage_ai::workflows::triage::{
    baseline_attributes, triage_router, Disposition, PatientAttributes, TriageConfig, TriageError,
};

#[test]
fn full_pipeline_matches_hand_computed_probability() {
    let service = common::service("pipeline", TriageConfig::default());
    let attributes = baseline_attributes()
        .with("SpO2", 86.0)
        .with("chest_pain", 1.0)
        .with("age", 72.0);

    let assessment = service.assess(&attributes).expect("assessment succeeds");
    let score = assessment.score.expect("scored path");

    let logit = 8.5 - 0.12 * 86.0 + 0.9 + 0.02 * 72.0 + 0.05 * 16.0;
    let base = 1.0 / (1.0 + f64::exp(-logit));
    assert!((score.base_probability - base).abs() < 1e-9);
    let expected = (base * 1.6 * 1.6 * 1.3).min(1.0);
    assert!((score.adjusted_probability - expected).abs() < 1e-9);
    assert_eq!(assessment.disposition, Disposition::NeedsErEvaluation);
}

#[test]
fn strict_policy_rejects_incomplete_patients() {
    let service = common::service("strict", TriageConfig::default());

    let result = service.assess(&PatientAttributes::new().with("SpO2", 97.0));

    match result {
        Err(TriageError::FeatureMismatch(message)) => {
            assert!(message.contains("blood_pressure"));
            assert!(message.contains("altered_mental_status"));
        }
        other => panic!("expected feature mismatch, got {other:?}"),
    }
}

#[test]
fn zero_fill_policy_scores_incomplete_patients() {
    let service = common::service("zero-fill", common::zero_fill());

    let assessment = service
        .assess(&PatientAttributes::new().with("SpO2", 97.0).with("age", 30.0))
        .expect("zero fill never rejects");

    assert!(assessment.score.is_some());
}

#[tokio::test]
async fn http_assessment_round_trip() {
    let router = triage_router(Arc::new(common::service(
        "http",
        common::zero_fill(),
    )));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/triage/assessments")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "SpO2": 99,
                "age": 25,
                "blood_pressure": 118,
                "temperature": 36.8,
                "pulse": 72,
                "respiratory_rate": 14,
                "mode_of_arrival": "walk_in"
            })
            .to_string(),
        ))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    let er = body["er_probability"].as_f64().expect("probability present");
    let discharge = body["discharge_probability"]
        .as_f64()
        .expect("probability present");
    assert!((er + discharge - 1.0).abs() < 1e-9);
    assert!(body["recommendations"]["actions"].is_array());
}
