//! Model-backed base probability for ER need.
//!
//! Artifacts are JSON documents produced by the offline training pipeline and
//! loaded once at startup. The scorer is read-only afterwards and can be shared
//! across request handlers.

mod model;
mod scaler;

pub use model::{
    Classifier, DecisionTree, ForestModel, LogisticModel, ModelArtifact, TreeNode, LEAF,
    UNDEFINED_FEATURE,
};
pub use scaler::StandardScaler;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::PatientAttributes;
use super::error::TriageError;
use super::evaluation::MissingFeaturePolicy;

/// Locations of the persisted model and optional feature scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub scaler_path: Option<PathBuf>,
}

/// Loaded classifier plus the preprocessing it was trained with.
#[derive(Debug, Clone)]
pub struct Scorer {
    model: ModelArtifact,
    scaler: Option<StandardScaler>,
    missing_features: MissingFeaturePolicy,
}

impl Scorer {
    pub fn load(
        artifacts: &ArtifactConfig,
        missing_features: MissingFeaturePolicy,
    ) -> Result<Self, TriageError> {
        let model: ModelArtifact = read_json(&artifacts.model_path)?;
        let scaler = artifacts
            .scaler_path
            .as_deref()
            .map(read_json::<StandardScaler>)
            .transpose()?;

        let scorer = Self::from_parts(model, scaler, missing_features).map_err(|error| {
            match error {
                TriageError::Configuration(reason) => TriageError::ArtifactCorrupt {
                    path: artifacts.model_path.clone(),
                    reason,
                },
                other => other,
            }
        })?;

        info!(
            path = %artifacts.model_path.display(),
            kind = scorer.model.kind(),
            features = scorer.feature_names().len(),
            scaled = scorer.scaler.is_some(),
            "loaded triage model"
        );
        Ok(scorer)
    }

    /// Builds a scorer from in-memory artifacts, checking they agree.
    pub fn from_parts(
        model: ModelArtifact,
        scaler: Option<StandardScaler>,
        missing_features: MissingFeaturePolicy,
    ) -> Result<Self, TriageError> {
        if let Some(reason) = model.defect() {
            return Err(TriageError::Configuration(reason));
        }
        if let Some(scaler) = &scaler {
            if let Some(reason) = scaler.defect() {
                return Err(TriageError::Configuration(reason));
            }
            let names = model.classifier().feature_names();
            if let Some(unknown) = scaler
                .feature_names
                .iter()
                .find(|name| !names.contains(name))
            {
                return Err(TriageError::FeatureMismatch(format!(
                    "scaler feature '{unknown}' is not a model feature"
                )));
            }
        }

        Ok(Self {
            model,
            scaler,
            missing_features,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        self.model.classifier().feature_names()
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Feature vector in trained order, after applying the missing-feature policy.
    pub fn feature_vector(&self, attributes: &PatientAttributes) -> Result<Vec<f64>, TriageError> {
        let names = self.feature_names();
        let missing: Vec<&str> = names
            .iter()
            .filter(|name| !attributes.contains(name))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            match self.missing_features {
                MissingFeaturePolicy::Reject => {
                    return Err(TriageError::FeatureMismatch(format!(
                        "missing features: {}",
                        missing.join(", ")
                    )))
                }
                MissingFeaturePolicy::ZeroFill => {
                    warn!(missing = ?missing, "zero-filling missing model features");
                }
            }
        }

        let non_finite: Vec<&str> = names
            .iter()
            .filter(|name| attributes.get(name).is_some_and(|value| !value.is_finite()))
            .map(String::as_str)
            .collect();
        if !non_finite.is_empty() {
            return Err(TriageError::FeatureMismatch(format!(
                "non-finite values for features: {}",
                non_finite.join(", ")
            )));
        }

        let mut features: Vec<f64> = names
            .iter()
            .map(|name| attributes.get(name).unwrap_or(0.0))
            .collect();
        if let Some(scaler) = &self.scaler {
            scaler.transform(names, &mut features);
        }
        Ok(features)
    }

    /// Positive-class probability in [0, 1].
    pub fn score(&self, attributes: &PatientAttributes) -> Result<f64, TriageError> {
        let features = self.feature_vector(attributes)?;
        let [_, positive] = self.model.classifier().predict_proba(&features);
        if !positive.is_finite() {
            return Err(TriageError::FeatureMismatch(
                "model produced a non-finite probability".to_string(),
            ));
        }
        Ok(positive.clamp(0.0, 1.0))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TriageError> {
    let raw = fs::read_to_string(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => TriageError::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => TriageError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: error.to_string(),
        },
    })?;

    serde_json::from_str(&raw).map_err(|error| TriageError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}
