//! Alert models pushed to alerting channels when a prediction is confident enough.

use serde::{Deserialize, Serialize};

/// Alert severity bands derived from prediction confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// A predicted-failure alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub module: String,
    pub confidence: f64,
    /// Human-readable time until the predicted failure, e.g. "in 2 minutes".
    pub time_to_error: String,
    pub message: String,
    /// Prediction that raised this alert.
    pub prediction_id: String,
    /// Epoch ms when the alert was raised.
    pub raised_at: i64,
}
