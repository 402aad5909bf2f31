use std::path::PathBuf;

/// Failure raised by the triage core.
///
/// Each variant is fatal to the single request that produced it; none of them
/// are used for ordinary outcomes such as "no rules fired".
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("model artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },
    #[error("model artifact {} is unusable: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },
    #[error("attributes do not match the model features: {0}")]
    FeatureMismatch(String),
    #[error("invalid rule configuration: {0}")]
    Configuration(String),
    #[error("invalid patient input: {0}")]
    InvalidInput(String),
}
