//! Error handling for Faultline.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod buffer_error;
pub mod classification_error;
pub mod config_error;
pub mod prediction_error;

pub use analysis_error::AnalysisError;
pub use buffer_error::BufferError;
pub use classification_error::ClassificationError;
pub use config_error::ConfigError;
pub use prediction_error::PredictionError;

/// Top-level error aggregating subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum FaultlineError {
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type FaultlineResult<T> = Result<T, FaultlineError>;
