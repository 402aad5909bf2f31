use serde::{Deserialize, Serialize};

use super::super::error::TriageError;

/// Runtime knobs for the triage pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Stroke symptoms needed to bypass scoring and force ER evaluation.
    pub stroke_override_threshold: u8,
    /// Adjusted probability above which the patient is routed to the ER.
    pub decision_threshold: f64,
    /// Probability gate used by recommendation triggers.
    pub recommendation_gate: f64,
    pub recommendation_mode: RecommendationMode,
    pub missing_features: MissingFeaturePolicy,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            stroke_override_threshold: 2,
            decision_threshold: 0.25,
            recommendation_gate: 0.5,
            recommendation_mode: RecommendationMode::Flat,
            missing_features: MissingFeaturePolicy::Reject,
        }
    }
}

impl TriageConfig {
    pub fn validate(&self) -> Result<(), TriageError> {
        if self.stroke_override_threshold == 0 {
            return Err(TriageError::Configuration(
                "stroke override threshold must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("decision threshold", self.decision_threshold),
            ("recommendation gate", self.recommendation_gate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TriageError::Configuration(format!(
                    "{name} {value} must lie within [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Whether recommendations are emitted per test or per umbrella category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationMode {
    Flat,
    Grouped,
}

impl RecommendationMode {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "grouped" | "group" | "category" => Some(Self::Grouped),
            _ => None,
        }
    }
}

/// Treatment of model features absent from the submitted attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Fail the request, naming the missing features.
    Reject,
    /// Substitute 0, which can make a missing vital look normal to the model.
    ZeroFill,
}

impl MissingFeaturePolicy {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "reject" | "strict" => Some(Self::Reject),
            "zero_fill" | "zero" => Some(Self::ZeroFill),
            _ => None,
        }
    }
}
