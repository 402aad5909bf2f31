use serde::{Deserialize, Serialize};

/// Per-feature standardization fitted alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub(crate) fn defect(&self) -> Option<String> {
        let count = self.feature_names.len();
        if self.mean.len() != count || self.scale.len() != count {
            return Some(format!(
                "scaler has {count} features, {} means and {} scales",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(name) = self
            .feature_names
            .iter()
            .zip(self.scale.iter())
            .find(|(_, scale)| !scale.is_finite() || **scale == 0.0)
            .map(|(name, _)| name)
        {
            return Some(format!("scale for '{name}' must be finite and non-zero"));
        }
        if self.mean.iter().any(|mean| !mean.is_finite()) {
            return Some("non-finite mean".to_string());
        }
        None
    }

    /// Standardizes `features` in place. `order` names each slot; features the
    /// scaler was not fitted on pass through unchanged.
    pub fn transform(&self, order: &[String], features: &mut [f64]) {
        for (slot, name) in order.iter().enumerate() {
            if let Some(position) = self.feature_names.iter().position(|known| known == name) {
                features[slot] = (features[slot] - self.mean[position]) / self.scale[position];
            }
        }
    }
}
