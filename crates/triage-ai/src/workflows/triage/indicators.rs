use serde::{Deserialize, Serialize};

use super::domain::{
    PatientAttributes, ALTERED_MENTAL_STATUS, BLOOD_PRESSURE, BLOOD_SUGAR, DIABETES,
    RESPIRATORY_RATE, SYNCOPE, TROUBLE_SPEAKING, TROUBLE_WALKING, UNILATERAL_WEAKNESS,
};

/// Derived value computed from the whole attribute mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Qsofa,
    StrokeSymptoms,
    DiabetesGlucose,
}

impl Indicator {
    pub fn evaluate(self, attributes: &PatientAttributes) -> f64 {
        match self {
            Indicator::Qsofa => f64::from(qsofa_score(attributes)),
            Indicator::StrokeSymptoms => f64::from(stroke_symptom_count(attributes)),
            Indicator::DiabetesGlucose => {
                if diabetes_glucose_flag(attributes) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::Qsofa => "qSOFA score",
            Indicator::StrokeSymptoms => "stroke symptom count",
            Indicator::DiabetesGlucose => "diabetes with abnormal glucose",
        }
    }
}

/// Quick SOFA: one point each for altered mentation, RR >= 22 and SBP <= 100.
pub fn qsofa_score(attributes: &PatientAttributes) -> u8 {
    let altered = attributes.flag(ALTERED_MENTAL_STATUS);
    let tachypnea = attributes.value_or_default(RESPIRATORY_RATE) >= 22.0;
    let hypotension = attributes.value_or_default(BLOOD_PRESSURE) <= 100.0;
    [altered, tachypnea, hypotension]
        .into_iter()
        .filter(|criterion| *criterion)
        .count() as u8
}

pub const STROKE_SYMPTOMS: [&str; 4] = [
    UNILATERAL_WEAKNESS,
    TROUBLE_SPEAKING,
    TROUBLE_WALKING,
    SYNCOPE,
];

pub fn stroke_symptom_count(attributes: &PatientAttributes) -> u8 {
    STROKE_SYMPTOMS
        .iter()
        .filter(|symptom| attributes.flag(symptom))
        .count() as u8
}

/// Known diabetic with glucose outside the 70-200 mg/dL safe band (bounds inclusive).
pub fn diabetes_glucose_flag(attributes: &PatientAttributes) -> bool {
    let glucose = attributes.value_or_default(BLOOD_SUGAR);
    attributes.flag(DIABETES) && (glucose <= 70.0 || glucose >= 200.0)
}
