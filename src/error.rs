use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

#[derive(Error, Debug)]
pub enum DetectorError {
    /// No usable training input, or an invalid setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A model artifact is absent on disk
    #[error(
        "Model artifact not found: {}. Run the `train` binary first to produce the model files.",
        path.display()
    )]
    MissingArtifact { path: PathBuf },

    /// The two artifacts were not produced by the same training run
    #[error(
        "Model artifacts do not belong together: classifier expects {classifier_features} features but the vectorizer produces {vectorizer_features}. Retrain to regenerate both files."
    )]
    ArtifactMismatch {
        classifier_features: usize,
        vectorizer_features: usize,
    },

    /// An artifact deserialized but its contents are not a usable model
    #[error("Model artifact is malformed: {0}. Retrain to regenerate both files.")]
    InvalidModel(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl DetectorError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        DetectorError::Configuration(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        DetectorError::Inference(msg.into())
    }

    pub fn invalid_model(msg: impl Into<String>) -> Self {
        DetectorError::InvalidModel(msg.into())
    }

    /// Whether the caller, rather than the model, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, DetectorError::BadRequest(_))
    }
}
