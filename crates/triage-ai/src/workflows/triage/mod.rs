//! Emergency-room triage: model scoring, rule adjustment, safety override and
//! diagnostic recommendations.
//!
//! A request flows through [`TriageService::assess`]: the stroke override is
//! checked first, then the model probability is compounded by the clinical
//! rules, a disposition is derived from the adjusted value, and the
//! recommendation table is resolved against the same context.

pub mod domain;
mod error;
pub mod evaluation;
pub mod indicators;
pub mod predicate;
pub mod recommendations;
pub mod registry;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    baseline_attributes, validate_ranges, ArrivalMode, AttributeValue, PatientAttributes,
    TRAINED_FEATURE_ORDER,
};
pub use error::TriageError;
pub use evaluation::{
    check_safety_override, AppliedRule, Disposition, MissingFeaturePolicy, ProbabilityRule,
    RecommendationMode, RuleEngine, SafetyOverride, ScoreResult, TriageConfig,
    STROKE_ESCALATION_MESSAGE,
};
pub use recommendations::{
    Condition, RecommendationResolver, RecommendationRule, RecommendationSet, RecommendedAction,
    NO_RECOMMENDATIONS,
};
pub use registry::RuleRegistry;
pub use router::triage_router;
pub use scorer::{ArtifactConfig, ModelArtifact, Scorer, StandardScaler};
pub use service::{TriageAssessment, TriageService};
