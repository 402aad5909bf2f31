use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::{
    PatientAttributes, AGE, BLOOD_PRESSURE, BLOOD_SUGAR, CHEST_PAIN, HEART_DISEASE,
    MODE_OF_ARRIVAL, PULSE, RESPIRATORY_RATE, SHORTNESS_OF_BREATH, SPO2, TEMPERATURE,
};
use super::super::indicators::Indicator;
use super::super::predicate::{
    at_least, between, equals, greater_than, less_than, outside, Predicate, RuleKey,
};
use super::AppliedRule;

/// Probability-boosting rule: when the predicate holds, multiply by `1 + weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRule {
    pub id: String,
    pub key: RuleKey,
    pub predicate: Predicate,
    pub weight: f64,
    pub description: String,
}

impl ProbabilityRule {
    pub fn new(
        id: &str,
        key: RuleKey,
        predicate: Predicate,
        weight: f64,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            key,
            predicate,
            weight,
            description: description.to_string(),
        }
    }

    pub fn fires(&self, attributes: &PatientAttributes) -> bool {
        self.predicate.test(self.key.operand(attributes))
    }
}

fn attribute(
    id: &str,
    name: &str,
    predicate: Predicate,
    weight: f64,
    description: &str,
) -> ProbabilityRule {
    ProbabilityRule::new(
        id,
        RuleKey::attribute(name),
        predicate,
        weight,
        description,
    )
}

fn composite(
    id: &str,
    indicator: Indicator,
    predicate: Predicate,
    weight: f64,
    description: &str,
) -> ProbabilityRule {
    ProbabilityRule::new(
        id,
        RuleKey::Composite(indicator),
        predicate,
        weight,
        description,
    )
}

/// Reference boosting table, in evaluation order.
pub fn standard_rules() -> Vec<ProbabilityRule> {
    vec![
        attribute("spo2_low", SPO2, less_than(90.0), 0.60, "SpO2 < 90%"),
        attribute(
            "bp_low",
            BLOOD_PRESSURE,
            less_than(90.0),
            0.60,
            "Blood pressure < 90 mmHg",
        ),
        attribute(
            "bp_high",
            BLOOD_PRESSURE,
            greater_than(140.0),
            0.30,
            "Blood pressure > 140 mmHg",
        ),
        attribute(
            "temperature_high",
            TEMPERATURE,
            greater_than(38.0),
            0.50,
            "Temperature > 38°C",
        ),
        attribute(
            "chest_pain",
            CHEST_PAIN,
            equals(1.0),
            0.60,
            "Chest pain present",
        ),
        attribute(
            "shortness_of_breath",
            SHORTNESS_OF_BREATH,
            equals(1.0),
            0.50,
            "Shortness of breath present",
        ),
        attribute(
            "heart_disease",
            HEART_DISEASE,
            equals(1.0),
            0.40,
            "Heart disease present",
        ),
        attribute("age_senior", AGE, at_least(65.0), 0.30, "Age ≥ 65 years"),
        attribute(
            "pulse_low",
            PULSE,
            less_than(60.0),
            0.80,
            "Pulse < 60 bpm (hypothermia risk)",
        ),
        attribute(
            "pulse_high",
            PULSE,
            greater_than(100.0),
            0.60,
            "Pulse > 100 bpm",
        ),
        attribute(
            "glucose_extreme",
            BLOOD_SUGAR,
            outside(70.0, 272.0),
            0.70,
            "Blood glucose ≤ 70 or ≥ 272 mg/dL",
        ),
        attribute(
            "ambulance_arrival",
            MODE_OF_ARRIVAL,
            equals(1.0),
            0.60,
            "Ambulance arrival",
        ),
        attribute(
            "rr_very_low",
            RESPIRATORY_RATE,
            less_than(8.0),
            0.30,
            "Respiratory rate < 8",
        ),
        attribute(
            "rr_elevated",
            RESPIRATORY_RATE,
            between(21.0, 24.0),
            0.30,
            "Respiratory rate 21–24",
        ),
        attribute(
            "rr_high",
            RESPIRATORY_RATE,
            at_least(25.0),
            0.60,
            "Respiratory rate ≥ 25",
        ),
        // qSOFA tiers are disjoint so at most one fires.
        composite(
            "qsofa_one",
            Indicator::Qsofa,
            equals(1.0),
            0.50,
            "qSOFA score = 1",
        ),
        composite(
            "qsofa_two_plus",
            Indicator::Qsofa,
            at_least(2.0),
            1.00,
            "qSOFA score ≥ 2",
        ),
        composite(
            "stroke_symptoms",
            Indicator::StrokeSymptoms,
            at_least(1.0),
            0.80,
            "Stroke symptoms present",
        ),
        composite(
            "diabetes_glucose",
            Indicator::DiabetesGlucose,
            equals(1.0),
            0.80,
            "Diabetes with blood glucose ≤ 70 or ≥ 200 mg/dL",
        ),
    ]
}

/// Evaluate each rule once, compounding the probability and recording the trail.
pub(crate) fn compound(
    rules: &[ProbabilityRule],
    attributes: &PatientAttributes,
    base_probability: f64,
) -> (f64, Vec<AppliedRule>) {
    let mut adjusted = base_probability;
    let mut applied = Vec::new();

    for rule in rules {
        if rule.fires(attributes) {
            adjusted *= 1.0 + rule.weight;
            debug!(rule = %rule.id, weight = rule.weight, "probability rule fired");
            applied.push(AppliedRule {
                rule_id: rule.id.clone(),
                weight: rule.weight,
                description: rule.description.clone(),
            });
        }
    }

    // NaN stays NaN rather than collapsing to the cap.
    if adjusted > 1.0 {
        adjusted = 1.0;
    }
    (adjusted, applied)
}
