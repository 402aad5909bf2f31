use std::path::PathBuf;

use super::common::*;
use crate::workflows::triage::domain::{
    PatientAttributes, AGE, BLOOD_PRESSURE, SPO2, SYNCOPE, TROUBLE_SPEAKING, TROUBLE_WALKING,
    UNILATERAL_WEAKNESS,
};
use crate::workflows::triage::{
    Disposition, TriageConfig, TriageError, TriageService, STROKE_ESCALATION_MESSAGE,
};

fn stable_patient() -> PatientAttributes {
    PatientAttributes::new().with(SPO2, 97.0).with(AGE, 40.0)
}

#[test]
fn two_stroke_symptoms_override_without_a_model() {
    let service = service_without_model();
    let attributes = stable_patient()
        .with(UNILATERAL_WEAKNESS, 1.0)
        .with(TROUBLE_SPEAKING, 1.0);

    let assessment = service.assess(&attributes).expect("override never needs the model");

    assert!(assessment.overridden());
    assert_eq!(assessment.disposition, Disposition::NeedsErEvaluation);
    assert_eq!(assessment.er_probability, 1.0);
    assert_eq!(assessment.discharge_probability, 0.0);
    assert!(assessment.score.is_none());
    assert_eq!(assessment.warning.as_deref(), Some(STROKE_ESCALATION_MESSAGE));
    assert!(assessment.recommendations.texts()[0].starts_with("Brain MRI"));
}

#[test]
fn override_ignores_the_model_probability() {
    let service = service(0.01);
    let attributes = stable_patient()
        .with(TROUBLE_WALKING, 1.0)
        .with(SYNCOPE, 1.0);

    let assessment = service.assess(&attributes).expect("assessment succeeds");

    assert_eq!(assessment.er_probability, 1.0);
    let override_details = assessment.safety_override.expect("override fired");
    assert_eq!(override_details.stroke_symptoms, 2);
    assert_eq!(override_details.threshold, 2);
}

#[test]
fn single_stroke_symptom_still_needs_the_model() {
    let service = service_without_model();
    let attributes = stable_patient().with(SYNCOPE, 1.0);

    match service.assess(&attributes) {
        Err(TriageError::ArtifactNotFound { path }) => {
            assert_eq!(path, PathBuf::from("model/er_model.json"))
        }
        other => panic!("expected missing model, got {other:?}"),
    }
}

#[test]
fn override_threshold_is_configurable() {
    let config = TriageConfig {
        stroke_override_threshold: 1,
        ..TriageConfig::default()
    };
    let service = service_with(None, config);

    let assessment = service
        .assess(&stable_patient().with(SYNCOPE, 1.0))
        .expect("single symptom overrides at threshold 1");

    assert!(assessment.overridden());
}

#[test]
fn low_probability_patient_is_safe_to_discharge() {
    let assessment = service(0.2)
        .assess(&stable_patient())
        .expect("assessment succeeds");

    assert_eq!(assessment.disposition, Disposition::SafeToDischarge);
    assert!(approx(assessment.er_probability, 0.2));
    assert!(approx(assessment.discharge_probability, 0.8));
    assert!(assessment.warning.is_none());
    assert!(assessment.recommendations.is_no_action());
}

#[test]
fn rule_boost_can_cross_the_decision_threshold() {
    let attributes = PatientAttributes::new()
        .with(SPO2, 85.0)
        .with(BLOOD_PRESSURE, 95.0)
        .with(AGE, 70.0);

    let assessment = service(0.2).assess(&attributes).expect("assessment succeeds");

    assert_eq!(assessment.disposition, Disposition::NeedsErEvaluation);
    let score = assessment.score.as_ref().expect("score recorded");
    assert!(approx(score.base_probability, 0.2));
    assert!(score.fired("spo2_low"));
    assert!(approx(assessment.er_probability, score.adjusted_probability));
    assert!(assessment
        .warning
        .as_deref()
        .is_some_and(|warning| warning.contains("urgent care")));
}

#[test]
fn decision_threshold_is_strict() {
    let probability = constant_scorer(0.3)
        .score(&stable_patient())
        .expect("scores");
    let config = TriageConfig {
        decision_threshold: probability,
        ..TriageConfig::default()
    };

    let assessment = service_with(Some(0.3), config)
        .assess(&stable_patient())
        .expect("assessment succeeds");

    assert_eq!(assessment.disposition, Disposition::SafeToDischarge);
}

#[test]
fn rejects_invalid_configuration() {
    let config = TriageConfig {
        stroke_override_threshold: 0,
        ..TriageConfig::default()
    };

    let result = TriageService::new(registry(), config, None, PathBuf::from("unused.json"));

    assert!(matches!(result, Err(TriageError::Configuration(_))));
}

#[test]
fn missing_model_features_fail_the_request() {
    let result = service(0.2).assess(&PatientAttributes::new().with(SPO2, 95.0));

    assert!(matches!(result, Err(TriageError::FeatureMismatch(_))));
}

#[test]
fn non_finite_vitals_fail_instead_of_escalating() {
    let attributes = stable_patient().with(SPO2, f64::NAN);

    let result = service(0.2).assess(&attributes);

    assert!(matches!(result, Err(TriageError::FeatureMismatch(_))));
}
