use serde::{Deserialize, Serialize};

/// Capability the scorer needs from a trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Feature names in the order the classifier was trained with.
    fn feature_names(&self) -> &[String];

    /// `[p_negative, p_positive]` for one feature vector.
    fn predict_proba(&self, features: &[f64]) -> [f64; 2];

    fn predict(&self, features: &[f64]) -> u8 {
        if self.predict_proba(features)[1] >= 0.5 {
            1
        } else {
            0
        }
    }
}

/// Serialized model artifact, tagged by algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticModel),
    RandomForest(ForestModel),
}

impl ModelArtifact {
    pub fn classifier(&self) -> &dyn Classifier {
        match self {
            ModelArtifact::LogisticRegression(model) => model,
            ModelArtifact::RandomForest(model) => model,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }

    /// Internal consistency problems that would make scoring meaningless.
    pub(crate) fn defect(&self) -> Option<String> {
        let names = self.classifier().feature_names();
        if names.is_empty() {
            return Some("artifact declares no features".to_string());
        }
        match self {
            ModelArtifact::LogisticRegression(model) => model.defect(),
            ModelArtifact::RandomForest(model) => model.defect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    fn defect(&self) -> Option<String> {
        if self.coefficients.len() != self.feature_names.len() {
            return Some(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Some("non-finite coefficient".to_string());
        }
        None
    }
}

impl Classifier for LogisticModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let logit = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        let positive = 1.0 / (1.0 + (-logit).exp());
        [1.0 - positive, positive]
    }
}

/// Leaf marker for child indices, matching the usual flattened-tree layout.
pub const LEAF: i64 = -1;

/// Feature index exported for leaves, which test nothing.
pub const UNDEFINED_FEATURE: i64 = -2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index tested at this node; negative for leaves.
    #[serde(default = "undefined_feature")]
    pub feature: i64,
    #[serde(default)]
    pub threshold: f64,
    pub left: i64,
    pub right: i64,
    /// Class weights `[negative, positive]` reaching this node.
    pub value: [f64; 2],
}

fn undefined_feature() -> i64 {
    UNDEFINED_FEATURE
}

impl TreeNode {
    fn is_leaf(&self) -> bool {
        self.left == LEAF || self.right == LEAF
    }

    fn feature_index(&self) -> Option<usize> {
        usize::try_from(self.feature).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf_distribution(&self, features: &[f64]) -> [f64; 2] {
        let mut index = 0usize;
        // Depth is bounded by the node count; validated trees never loop.
        for _ in 0..self.nodes.len() {
            let node = &self.nodes[index];
            if node.is_leaf() {
                let total = node.value[0] + node.value[1];
                if total <= 0.0 {
                    return [0.5, 0.5];
                }
                return [node.value[0] / total, node.value[1] / total];
            }
            let value = node
                .feature_index()
                .and_then(|feature| features.get(feature).copied())
                .unwrap_or(0.0);
            index = if value <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
        [0.5, 0.5]
    }

    fn defect(&self, feature_count: usize) -> Option<String> {
        if self.nodes.is_empty() {
            return Some("tree without nodes".to_string());
        }
        let count = self.nodes.len() as i64;
        for (position, node) in self.nodes.iter().enumerate() {
            if node.value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Some(format!("node {position} has invalid class weights"));
            }
            if node.is_leaf() {
                continue;
            }
            if !node
                .feature_index()
                .is_some_and(|feature| feature < feature_count)
            {
                return Some(format!(
                    "node {position} tests feature {} of {feature_count}",
                    node.feature
                ));
            }
            // Children must point forward so traversal always terminates.
            for child in [node.left, node.right] {
                if child <= position as i64 || child >= count {
                    return Some(format!("node {position} has invalid child index {child}"));
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    fn defect(&self) -> Option<String> {
        if self.trees.is_empty() {
            return Some("forest without trees".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .find_map(|(position, tree)| {
                tree.defect(self.feature_names.len())
                    .map(|reason| format!("tree {position}: {reason}"))
            })
    }
}

impl Classifier for ForestModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let mut totals = [0.0, 0.0];
        for tree in &self.trees {
            let [negative, positive] = tree.leaf_distribution(features);
            totals[0] += negative;
            totals[1] += positive;
        }
        let count = self.trees.len().max(1) as f64;
        [totals[0] / count, totals[1] / count]
    }
}
