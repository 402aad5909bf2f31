use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    PatientAttributes, AGE, BLOOD_PRESSURE, CHEST_PAIN, HEART_DISEASE, SHORTNESS_OF_BREATH, SPO2,
    TEMPERATURE,
};
use super::evaluation::RecommendationMode;
use super::indicators::Indicator;
use super::predicate::{at_least, equals, greater_than, less_than, Predicate, RuleKey};
use super::registry::RuleRegistry;

pub const NO_RECOMMENDATIONS: &str = "No recommendations";

/// Trigger for a recommendation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Check { key: RuleKey, predicate: Predicate },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    /// Strictly above a fixed probability.
    ProbabilityAbove { value: f64 },
    /// Strictly above the configured recommendation gate.
    ProbabilityAboveGate,
}

impl Condition {
    pub fn check(key: RuleKey, predicate: Predicate) -> Self {
        Condition::Check { key, predicate }
    }

    pub fn attribute(name: &str, predicate: Predicate) -> Self {
        Condition::check(RuleKey::attribute(name), predicate)
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    pub fn holds(&self, attributes: &PatientAttributes, probability: f64, gate: f64) -> bool {
        match self {
            Condition::Check { key, predicate } => predicate.test(key.operand(attributes)),
            Condition::All { conditions } => conditions
                .iter()
                .all(|condition| condition.holds(attributes, probability, gate)),
            Condition::Any { conditions } => conditions
                .iter()
                .any(|condition| condition.holds(attributes, probability, gate)),
            Condition::ProbabilityAbove { value } => probability > *value,
            Condition::ProbabilityAboveGate => probability > gate,
        }
    }

    pub(crate) fn predicates(&self) -> Vec<&Predicate> {
        match self {
            Condition::Check { predicate, .. } => vec![predicate],
            Condition::All { conditions } | Condition::Any { conditions } => conditions
                .iter()
                .flat_map(|condition| condition.predicates())
                .collect(),
            Condition::ProbabilityAbove { .. } | Condition::ProbabilityAboveGate => Vec::new(),
        }
    }

    pub(crate) fn probability_floors(&self) -> Vec<f64> {
        match self {
            Condition::ProbabilityAbove { value } => vec![*value],
            Condition::All { conditions } | Condition::Any { conditions } => conditions
                .iter()
                .flat_map(|condition| condition.probability_floors())
                .collect(),
            Condition::Check { .. } | Condition::ProbabilityAboveGate => Vec::new(),
        }
    }
}

/// Maps a trigger to diagnostic actions with a clinical priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub id: String,
    /// Umbrella label emitted in grouped mode.
    pub category: String,
    pub condition: Condition,
    pub weight: f64,
    pub actions: Vec<String>,
}

impl RecommendationRule {
    pub fn new(
        id: &str,
        category: &str,
        condition: Condition,
        weight: f64,
        actions: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            condition,
            weight,
            actions: actions.iter().map(|action| action.to_string()).collect(),
        }
    }
}

const CARDIAC_CATEGORY: &str = "Cardiac Risk Tests";

/// Reference recommendation table, in registration (tie-break) order.
pub fn standard_recommendations() -> Vec<RecommendationRule> {
    vec![
        RecommendationRule::new(
            "stroke_suspected",
            "Neurological Tests",
            Condition::all(vec![
                Condition::check(RuleKey::Composite(Indicator::StrokeSymptoms), at_least(1.0)),
                Condition::ProbabilityAboveGate,
            ]),
            1.00,
            &["Brain MRI with DWI: high sensitivity and specificity for diagnosing acute stroke"],
        ),
        RecommendationRule::new(
            "cardiac_ischemia",
            CARDIAC_CATEGORY,
            Condition::all(vec![
                Condition::attribute(CHEST_PAIN, equals(1.0)),
                Condition::attribute(HEART_DISEASE, equals(1.0)),
                Condition::ProbabilityAboveGate,
            ]),
            0.90,
            &[
                "Electrocardiogram (ECG): detects ischemic changes (e.g., ST elevation)",
                "Troponin I or T blood test: highly specific for myocardial injury",
                "Coronary angiography (if initial tests confirm ischemia): identifies coronary artery blockages",
            ],
        ),
        RecommendationRule::new(
            "infection_sepsis",
            "Infection and Sepsis Tests",
            Condition::all(vec![
                Condition::attribute(TEMPERATURE, greater_than(38.0)),
                Condition::ProbabilityAboveGate,
            ]),
            0.80,
            &[
                "Blood cultures: identifies bloodstream infections",
                "C-reactive protein (CRP) and procalcitonin: biomarkers for systemic infection or sepsis",
                "Urinalysis and urine culture: rules out urinary tract infection",
            ],
        ),
        RecommendationRule::new(
            "pulmonary_issues",
            "Pulmonary Tests",
            Condition::all(vec![
                Condition::attribute(SPO2, less_than(92.0)),
                Condition::attribute(SHORTNESS_OF_BREATH, equals(1.0)),
                Condition::ProbabilityAboveGate,
            ]),
            0.70,
            &[
                "Chest X-ray: detects pneumonia, consolidation, or other lung abnormalities",
                "Arterial blood gas (ABG): assesses oxygenation and CO2 levels",
                "Complete Blood Count (CBC): checks for infection (e.g., elevated white blood cells)",
            ],
        ),
        RecommendationRule::new(
            "cardiac_risk",
            CARDIAC_CATEGORY,
            Condition::all(vec![
                Condition::any(vec![
                    Condition::attribute(BLOOD_PRESSURE, greater_than(140.0)),
                    Condition::attribute(BLOOD_PRESSURE, less_than(90.0)),
                    Condition::attribute(SPO2, less_than(92.0)),
                ]),
                Condition::attribute(HEART_DISEASE, equals(1.0)),
                Condition::attribute(AGE, at_least(65.0)),
            ]),
            0.60,
            &[
                "Stress echocardiography: assesses heart function under stress to detect coronary artery disease",
                "NT-proBNP or BNP blood test: evaluates heart failure risk",
                "Coronary calcium score (CAC), non-contrast CT: quantifies coronary artery calcification",
            ],
        ),
    ]
}

/// One recommended action with its priority weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub text: String,
    pub weight: f64,
}

/// Ordered, duplicate-free recommendations. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    actions: Vec<RecommendedAction>,
}

impl RecommendationSet {
    pub fn no_action() -> Self {
        Self {
            actions: vec![RecommendedAction {
                text: NO_RECOMMENDATIONS.to_string(),
                weight: 0.0,
            }],
        }
    }

    pub fn is_no_action(&self) -> bool {
        self.actions.len() == 1 && self.actions[0].text == NO_RECOMMENDATIONS
    }

    pub fn actions(&self) -> &[RecommendedAction] {
        &self.actions
    }

    pub fn texts(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Evaluates the recommendation table against a patient and probability context.
#[derive(Debug, Clone)]
pub struct RecommendationResolver {
    registry: Arc<RuleRegistry>,
    mode: RecommendationMode,
    gate: f64,
}

impl RecommendationResolver {
    pub fn new(registry: Arc<RuleRegistry>, mode: RecommendationMode, gate: f64) -> Self {
        Self {
            registry,
            mode,
            gate,
        }
    }

    pub fn mode(&self) -> RecommendationMode {
        self.mode
    }

    pub fn resolve(&self, attributes: &PatientAttributes, probability: f64) -> RecommendationSet {
        let mut collected: Vec<RecommendedAction> = Vec::new();

        for rule in self.registry.recommendations() {
            if !rule.condition.holds(attributes, probability, self.gate) {
                continue;
            }

            let emitted: Vec<&str> = match self.mode {
                RecommendationMode::Flat => rule.actions.iter().map(String::as_str).collect(),
                RecommendationMode::Grouped => vec![rule.category.as_str()],
            };

            for text in emitted {
                match collected.iter_mut().find(|action| action.text == text) {
                    Some(existing) => existing.weight = existing.weight.max(rule.weight),
                    None => collected.push(RecommendedAction {
                        text: text.to_string(),
                        weight: rule.weight,
                    }),
                }
            }
        }

        if collected.is_empty() {
            return RecommendationSet::no_action();
        }

        // Stable sort keeps registration order among equal weights.
        collected.sort_by(|left, right| right.weight.total_cmp(&left.weight));
        RecommendationSet { actions: collected }
    }
}
