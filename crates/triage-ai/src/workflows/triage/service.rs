use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::PatientAttributes;
use super::error::TriageError;
use super::evaluation::{
    check_safety_override, Disposition, RuleEngine, SafetyOverride, ScoreResult, TriageConfig,
};
use super::recommendations::{RecommendationResolver, RecommendationSet};
use super::registry::RuleRegistry;
use super::scorer::Scorer;

/// Complete triage outcome for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageAssessment {
    pub disposition: Disposition,
    pub er_probability: f64,
    pub discharge_probability: f64,
    /// Model and rule audit trail; absent when the safety override fired.
    pub score: Option<ScoreResult>,
    pub safety_override: Option<SafetyOverride>,
    pub recommendations: RecommendationSet,
    pub warning: Option<String>,
    pub assessed_at: DateTime<Utc>,
}

impl TriageAssessment {
    pub fn overridden(&self) -> bool {
        self.safety_override.is_some()
    }
}

/// Service composing the safety override, scorer, rule engine and resolver.
pub struct TriageService {
    registry: Arc<RuleRegistry>,
    config: TriageConfig,
    engine: RuleEngine,
    resolver: RecommendationResolver,
    scorer: Option<Arc<Scorer>>,
    model_path: PathBuf,
}

impl TriageService {
    /// `scorer` may be absent when the model failed to load; assessments that
    /// need it then fail with [`TriageError::ArtifactNotFound`].
    pub fn new(
        registry: Arc<RuleRegistry>,
        config: TriageConfig,
        scorer: Option<Arc<Scorer>>,
        model_path: PathBuf,
    ) -> Result<Self, TriageError> {
        config.validate()?;
        let engine = RuleEngine::new(registry.clone());
        let resolver = RecommendationResolver::new(
            registry.clone(),
            config.recommendation_mode,
            config.recommendation_gate,
        );

        Ok(Self {
            registry,
            config,
            engine,
            resolver,
            scorer,
            model_path,
        })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn model_loaded(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn assess(&self, attributes: &PatientAttributes) -> Result<TriageAssessment, TriageError> {
        if let Some(safety_override) = check_safety_override(attributes, &self.config) {
            let recommendations = self.resolver.resolve(attributes, 1.0);
            return Ok(TriageAssessment {
                disposition: Disposition::NeedsErEvaluation,
                er_probability: 1.0,
                discharge_probability: 0.0,
                score: None,
                warning: Some(safety_override.message.clone()),
                safety_override: Some(safety_override),
                recommendations,
                assessed_at: Utc::now(),
            });
        }

        let scorer = self
            .scorer
            .as_ref()
            .ok_or_else(|| TriageError::ArtifactNotFound {
                path: self.model_path.clone(),
            })?;

        let base_probability = scorer.score(attributes)?;
        let score = self.engine.apply(attributes, base_probability);
        let probability = score.adjusted_probability;
        let recommendations = self.resolver.resolve(attributes, probability);
        let disposition = Disposition::from_probability(probability, &self.config);

        debug!(
            base_probability,
            adjusted_probability = probability,
            rules = score.applied_rules.len(),
            "scored patient"
        );
        info!(
            disposition = disposition.label(),
            er_probability = probability,
            "triage assessment completed"
        );

        Ok(TriageAssessment {
            disposition,
            er_probability: probability,
            discharge_probability: 1.0 - probability,
            warning: disposition.warning().map(str::to_string),
            score: Some(score),
            safety_override: None,
            recommendations,
            assessed_at: Utc::now(),
        })
    }
}
