/// Prediction engine errors.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("model '{model}' failed: {reason}")]
    ModelFailed { model: String, reason: String },

    #[error("invalid prediction: {reason}")]
    InvalidPrediction { reason: String },

    #[error("alert delivery via '{channel}' failed: {reason}")]
    AlertDelivery { channel: String, reason: String },
}
