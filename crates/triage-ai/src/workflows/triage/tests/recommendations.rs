use std::sync::Arc;

use super::common::*;
use crate::workflows::triage::domain::{
    baseline_attributes, AGE, ALTERED_MENTAL_STATUS, BLOOD_PRESSURE, CHEST_PAIN, HEART_DISEASE,
    RESPIRATORY_RATE, SHORTNESS_OF_BREATH, SPO2, TEMPERATURE, TROUBLE_SPEAKING,
};
use crate::workflows::triage::evaluation::standard_rules;
use crate::workflows::triage::predicate::less_than;
use crate::workflows::triage::{
    Condition, RecommendationMode, RecommendationResolver, RecommendationRule, RuleRegistry,
    NO_RECOMMENDATIONS,
};

#[test]
fn quiet_patient_gets_the_sentinel() {
    let set = resolver(RecommendationMode::Flat).resolve(&baseline_attributes(), 0.1);

    assert!(set.is_no_action());
    assert_eq!(set.texts(), vec![NO_RECOMMENDATIONS]);
}

#[test]
fn stroke_symptom_with_high_probability_recommends_mri_first() {
    let attributes = baseline_attributes()
        .with(TROUBLE_SPEAKING, 1.0)
        .with(TEMPERATURE, 38.6);

    let set = resolver(RecommendationMode::Flat).resolve(&attributes, 0.8);

    assert!(set.texts()[0].starts_with("Brain MRI"));
    assert_eq!(set.actions()[0].weight, 1.0);
    assert!(set.texts().iter().any(|text| text.starts_with("Blood cultures")));
}

#[test]
fn probability_gate_is_strict() {
    let attributes = baseline_attributes().with(TEMPERATURE, 39.0);

    let at_gate = resolver(RecommendationMode::Flat).resolve(&attributes, 0.5);
    assert!(at_gate.is_no_action());

    let above = resolver(RecommendationMode::Flat).resolve(&attributes, 0.51);
    assert_eq!(above.len(), 3);
}

#[test]
fn fever_recommends_exactly_the_infection_workup() {
    let attributes = baseline_attributes().with(TEMPERATURE, 39.0);

    let set = resolver(RecommendationMode::Flat).resolve(&attributes, 0.8);
    let texts = set.texts();

    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("Blood cultures"));
    assert!(texts[1].starts_with("C-reactive protein"));
    assert!(texts[2].starts_with("Urinalysis"));
    assert!(set.actions().iter().all(|action| action.weight == 0.8));
}

#[test]
fn sepsis_score_without_fever_adds_no_tests() {
    let attributes = baseline_attributes()
        .with(ALTERED_MENTAL_STATUS, 1.0)
        .with(RESPIRATORY_RATE, 24.0)
        .with(BLOOD_PRESSURE, 95.0);

    let set = resolver(RecommendationMode::Flat).resolve(&attributes, 0.9);

    assert!(set.is_no_action());
}

#[test]
fn standard_table_has_the_five_diagnostic_rules() {
    let registry = registry();
    let ids: Vec<&str> = registry
        .recommendations()
        .iter()
        .map(|rule| rule.id.as_str())
        .collect();

    assert_eq!(
        ids,
        vec![
            "stroke_suspected",
            "cardiac_ischemia",
            "infection_sepsis",
            "pulmonary_issues",
            "cardiac_risk",
        ]
    );
}

fn custom_resolver(recommendations: Vec<RecommendationRule>) -> RecommendationResolver {
    let registry = RuleRegistry::new(standard_rules(), recommendations).expect("valid tables");
    RecommendationResolver::new(Arc::new(registry), RecommendationMode::Flat, 0.5)
}

fn hypoxia_rule(id: &str, weight: f64, actions: &[&str]) -> RecommendationRule {
    RecommendationRule::new(
        id,
        "Pulmonary Tests",
        Condition::attribute(SPO2, less_than(92.0)),
        weight,
        actions,
    )
}

#[test]
fn shared_actions_are_listed_once_at_highest_weight() {
    let resolver = custom_resolver(vec![
        hypoxia_rule("oxygen_low", 0.4, &["Chest X-ray", "CBC"]),
        hypoxia_rule("oxygen_critical", 0.9, &["ABG", "CBC"]),
    ]);

    let set = resolver.resolve(&baseline_attributes().with(SPO2, 88.0), 0.2);

    assert_eq!(set.texts(), vec!["CBC", "ABG", "Chest X-ray"]);
    assert_eq!(set.actions()[0].weight, 0.9);
}

#[test]
fn equal_weights_keep_registration_order() {
    let resolver = custom_resolver(vec![
        hypoxia_rule("first", 0.7, &["Chest X-ray"]),
        hypoxia_rule("second", 0.7, &["ABG"]),
        hypoxia_rule("third", 0.7, &["Pulse oximetry trend"]),
    ]);

    let set = resolver.resolve(&baseline_attributes().with(SPO2, 88.0), 0.2);

    assert_eq!(set.texts(), vec!["Chest X-ray", "ABG", "Pulse oximetry trend"]);
}

#[test]
fn cardiac_risk_rule_ignores_probability() {
    let attributes = baseline_attributes()
        .with(HEART_DISEASE, 1.0)
        .with(AGE, 70.0)
        .with(BLOOD_PRESSURE, 150.0);

    let set = resolver(RecommendationMode::Flat).resolve(&attributes, 0.0);

    assert_eq!(set.len(), 3);
    assert!(set.texts()[0].starts_with("Stress echocardiography"));
}

#[test]
fn pulmonary_workup_includes_a_blood_count() {
    let attributes = baseline_attributes()
        .with(SPO2, 88.0)
        .with(SHORTNESS_OF_BREATH, 1.0);

    let set = resolver(RecommendationMode::Flat).resolve(&attributes, 0.6);
    let texts = set.texts();

    assert_eq!(texts.len(), 3);
    assert!(texts[0].starts_with("Chest X-ray"));
    assert!(texts[2].starts_with("Complete Blood Count"));
}

#[test]
fn grouped_mode_merges_rules_sharing_a_category() {
    let attributes = baseline_attributes()
        .with(CHEST_PAIN, 1.0)
        .with(HEART_DISEASE, 1.0)
        .with(AGE, 72.0)
        .with(BLOOD_PRESSURE, 150.0);

    let resolver = resolver(RecommendationMode::Grouped);
    assert_eq!(resolver.mode(), RecommendationMode::Grouped);
    let set = resolver.resolve(&attributes, 0.9);

    assert_eq!(set.texts(), vec!["Cardiac Risk Tests"]);
    assert_eq!(set.actions()[0].weight, 0.9);
}

#[test]
fn resolution_is_idempotent() {
    let attributes = baseline_attributes()
        .with(CHEST_PAIN, 1.0)
        .with(HEART_DISEASE, 1.0);
    let resolver = resolver(RecommendationMode::Flat);

    assert_eq!(
        resolver.resolve(&attributes, 0.7),
        resolver.resolve(&attributes, 0.7)
    );
}
