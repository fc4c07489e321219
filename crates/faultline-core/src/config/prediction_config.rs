use serde::{Deserialize, Serialize};

use super::defaults;

/// Prediction engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Predictions below this confidence are rejected.
    pub confidence_floor: f64,
    /// Predictions at or above this confidence raise an alert.
    pub alert_threshold: f64,
    /// Tolerance around the expected time when verifying (seconds).
    pub verification_window_secs: u64,
    /// Active predictions closer than this are merged (seconds).
    pub merge_window_secs: u64,
    /// Resolved predictions retained.
    pub history_capacity: usize,
    /// Events retained for model input.
    pub event_history_capacity: usize,
    /// Window used to mine module sequences (seconds).
    pub sequence_window_secs: u64,
    /// Fixed delay of sequence predictions (seconds).
    pub sequence_delay_secs: u64,
    /// Sliding window of an active error sequence (seconds).
    pub cascade_window_secs: u64,
    /// Cascade risk at which a cascade prediction is made.
    pub cascade_risk_threshold: f64,
    /// Delay of cascade predictions (seconds).
    pub cascade_delay_secs: u64,
    /// Interval between stale-prediction sweeps (seconds).
    pub expiry_interval_secs: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            confidence_floor: defaults::DEFAULT_CONFIDENCE_FLOOR,
            alert_threshold: defaults::DEFAULT_ALERT_THRESHOLD,
            verification_window_secs: defaults::DEFAULT_VERIFICATION_WINDOW_SECS,
            merge_window_secs: defaults::DEFAULT_MERGE_WINDOW_SECS,
            history_capacity: defaults::DEFAULT_PREDICTION_HISTORY_CAPACITY,
            event_history_capacity: defaults::DEFAULT_EVENT_HISTORY_CAPACITY,
            sequence_window_secs: defaults::DEFAULT_SEQUENCE_WINDOW_SECS,
            sequence_delay_secs: defaults::DEFAULT_SEQUENCE_DELAY_SECS,
            cascade_window_secs: defaults::DEFAULT_CASCADE_WINDOW_SECS,
            cascade_risk_threshold: defaults::DEFAULT_CASCADE_RISK_THRESHOLD,
            cascade_delay_secs: defaults::DEFAULT_CASCADE_DELAY_SECS,
            expiry_interval_secs: defaults::DEFAULT_EXPIRY_INTERVAL_SECS,
        }
    }
}
