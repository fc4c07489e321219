/// Pattern analysis errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid analysis window: {reason}")]
    InvalidWindow { reason: String },

    #[error("insufficient data: needed {needed}, available {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("analysis rules unavailable: {reason}")]
    RulesUnavailable { reason: String },
}
