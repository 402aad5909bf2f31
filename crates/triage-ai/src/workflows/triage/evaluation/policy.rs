use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::domain::PatientAttributes;
use super::super::indicators::stroke_symptom_count;
use super::config::TriageConfig;

pub const STROKE_ESCALATION_MESSAGE: &str =
    "Stroke-related symptoms detected. Immediate ER evaluation required.";

pub const URGENT_CARE_WARNING: &str =
    "This patient may need urgent care. Please review carefully.";

/// Final routing decision presented to clinicians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    NeedsErEvaluation,
    SafeToDischarge,
}

impl Disposition {
    pub fn from_probability(probability: f64, config: &TriageConfig) -> Self {
        if probability > config.decision_threshold {
            Disposition::NeedsErEvaluation
        } else {
            Disposition::SafeToDischarge
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Disposition::NeedsErEvaluation => "Needs ER Evaluation",
            Disposition::SafeToDischarge => "Safe to Discharge",
        }
    }

    pub fn warning(self) -> Option<&'static str> {
        match self {
            Disposition::NeedsErEvaluation => Some(URGENT_CARE_WARNING),
            Disposition::SafeToDischarge => None,
        }
    }
}

/// Hard escalation that supersedes the model and rule engine entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyOverride {
    pub stroke_symptoms: u8,
    pub threshold: u8,
    pub message: String,
}

pub fn check_safety_override(
    attributes: &PatientAttributes,
    config: &TriageConfig,
) -> Option<SafetyOverride> {
    let stroke_symptoms = stroke_symptom_count(attributes);
    if stroke_symptoms < config.stroke_override_threshold {
        return None;
    }

    warn!(
        stroke_symptoms,
        threshold = config.stroke_override_threshold,
        "stroke safety override engaged"
    );

    Some(SafetyOverride {
        stroke_symptoms,
        threshold: config.stroke_override_threshold,
        message: STROKE_ESCALATION_MESSAGE.to_string(),
    })
}
