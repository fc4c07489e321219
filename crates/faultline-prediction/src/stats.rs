use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-model counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub generated: u64,
    pub fulfilled: u64,
    pub failures: u64,
}

/// Prediction engine report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionStats {
    /// Predictions created (merges not counted).
    pub generated: u64,
    pub merged: u64,
    /// Candidates that failed validation.
    pub rejected: u64,
    pub active: usize,
    pub fulfilled: u64,
    pub expired: u64,
    /// fulfilled / resolved.
    pub accuracy: f64,
    /// fulfilled / generated.
    pub precision: f64,
    /// Mean timing accuracy of fulfilled predictions.
    pub mean_timing_accuracy: f64,
    pub by_model: BTreeMap<String, ModelStats>,
    pub alerts_raised: u64,
    pub alert_failures: u64,
}
