use std::collections::HashMap;

use serde::Serialize;

use super::error::TriageError;
use super::evaluation::{standard_rules, ProbabilityRule};
use super::recommendations::{standard_recommendations, RecommendationRule};

/// Immutable, validated rule tables shared by the engine and resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRegistry {
    rules: Vec<ProbabilityRule>,
    recommendations: Vec<RecommendationRule>,
}

impl RuleRegistry {
    pub fn new(
        rules: Vec<ProbabilityRule>,
        recommendations: Vec<RecommendationRule>,
    ) -> Result<Self, TriageError> {
        let rules = validate_rules(rules)?;
        validate_recommendations(&recommendations)?;
        Ok(Self {
            rules,
            recommendations,
        })
    }

    pub fn standard() -> Result<Self, TriageError> {
        Self::new(standard_rules(), standard_recommendations())
    }

    pub fn rules(&self) -> &[ProbabilityRule] {
        &self.rules
    }

    pub fn recommendations(&self) -> &[RecommendationRule] {
        &self.recommendations
    }

    pub fn rule(&self, id: &str) -> Option<&ProbabilityRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }
}

fn check_weight(id: &str, weight: f64) -> Result<(), TriageError> {
    if weight.is_finite() && weight > 0.0 && weight <= 1.0 {
        Ok(())
    } else {
        Err(TriageError::Configuration(format!(
            "rule '{id}' weight {weight} must lie in (0, 1]"
        )))
    }
}

fn validate_rules(rules: Vec<ProbabilityRule>) -> Result<Vec<ProbabilityRule>, TriageError> {
    let mut seen: HashMap<String, ProbabilityRule> = HashMap::new();
    let mut unique = Vec::with_capacity(rules.len());

    for rule in rules {
        if rule.id.trim().is_empty() {
            return Err(TriageError::Configuration(
                "probability rule with empty identifier".to_string(),
            ));
        }
        if rule.description.trim().is_empty() {
            return Err(TriageError::Configuration(format!(
                "rule '{}' has an empty description",
                rule.id
            )));
        }
        check_weight(&rule.id, rule.weight)?;
        if let Some(defect) = rule.predicate.defect() {
            return Err(TriageError::Configuration(format!(
                "rule '{}': {defect}",
                rule.id
            )));
        }

        match seen.get(&rule.id) {
            Some(existing) if existing == &rule => continue,
            Some(existing) => {
                return Err(TriageError::Configuration(format!(
                    "rule '{}' registered twice with conflicting definitions (weight {} vs {})",
                    rule.id, existing.weight, rule.weight
                )))
            }
            None => {
                seen.insert(rule.id.clone(), rule.clone());
                unique.push(rule);
            }
        }
    }

    Ok(unique)
}

fn validate_recommendations(recommendations: &[RecommendationRule]) -> Result<(), TriageError> {
    let mut ids: Vec<&str> = Vec::with_capacity(recommendations.len());

    for rule in recommendations {
        if rule.id.trim().is_empty() {
            return Err(TriageError::Configuration(
                "recommendation rule with empty identifier".to_string(),
            ));
        }
        if ids.contains(&rule.id.as_str()) {
            return Err(TriageError::Configuration(format!(
                "recommendation '{}' registered twice",
                rule.id
            )));
        }
        ids.push(&rule.id);

        check_weight(&rule.id, rule.weight)?;
        if rule.category.trim().is_empty() {
            return Err(TriageError::Configuration(format!(
                "recommendation '{}' has no category",
                rule.id
            )));
        }
        if rule.actions.is_empty() || rule.actions.iter().any(|text| text.trim().is_empty()) {
            return Err(TriageError::Configuration(format!(
                "recommendation '{}' needs at least one non-empty action",
                rule.id
            )));
        }
        for predicate in rule.condition.predicates() {
            if let Some(defect) = predicate.defect() {
                return Err(TriageError::Configuration(format!(
                    "recommendation '{}': {defect}",
                    rule.id
                )));
            }
        }
        if let Some(floor) = rule
            .condition
            .probability_floors()
            .into_iter()
            .find(|floor| !(0.0..=1.0).contains(floor))
        {
            return Err(TriageError::Configuration(format!(
                "recommendation '{}' probability threshold {floor} must lie within [0, 1]",
                rule.id
            )));
        }
    }

    Ok(())
}
