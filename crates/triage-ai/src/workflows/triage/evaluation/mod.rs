mod config;
mod policy;
mod rules;

pub use config::{MissingFeaturePolicy, RecommendationMode, TriageConfig};
pub use policy::{check_safety_override, Disposition, SafetyOverride, STROKE_ESCALATION_MESSAGE};
pub use rules::{standard_rules, ProbabilityRule};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::PatientAttributes;
use super::registry::RuleRegistry;

/// Stateless engine that compounds a base probability with the registered rules.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    registry: Arc<RuleRegistry>,
}

impl RuleEngine {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// `adjusted = min(1, base × Π(1 + weight))` over the rules that fired.
    ///
    /// This is a heuristic boost stacked on the model score, not a calibrated
    /// probability.
    pub fn apply(&self, attributes: &PatientAttributes, base_probability: f64) -> ScoreResult {
        let base_probability = base_probability.clamp(0.0, 1.0);
        let (adjusted_probability, applied_rules) =
            rules::compound(self.registry.rules(), attributes, base_probability);

        ScoreResult {
            base_probability,
            adjusted_probability,
            applied_rules,
        }
    }
}

/// A rule that fired, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRule {
    pub rule_id: String,
    pub weight: f64,
    pub description: String,
}

/// Model probability together with its rule-adjusted value and explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub base_probability: f64,
    pub adjusted_probability: f64,
    pub applied_rules: Vec<AppliedRule>,
}

impl ScoreResult {
    pub fn fired(&self, rule_id: &str) -> bool {
        self.applied_rules.iter().any(|rule| rule.rule_id == rule_id)
    }

    pub fn multiplier(&self) -> f64 {
        self.applied_rules
            .iter()
            .map(|rule| 1.0 + rule.weight)
            .product()
    }
}
