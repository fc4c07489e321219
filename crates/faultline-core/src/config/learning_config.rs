use serde::{Deserialize, Serialize};

use super::defaults;

/// Learning system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Rolling window for context samples (seconds).
    pub context_window_secs: u64,
    /// Samples required before statistics are computed.
    pub min_samples: usize,
    /// Trailing window for periodicity learning (seconds).
    pub pattern_window_secs: u64,
    /// Step size when nudging a threshold toward the observed rate.
    pub learning_rate: f64,
    /// Relative difference that triggers a threshold update.
    pub threshold_change_ratio: f64,
    /// Attempts before a recovery strategy can be recommended.
    pub min_recovery_attempts: u64,
    /// Minimum confidence of a context pattern in recommendations.
    pub context_confidence_cutoff: f64,
    /// Minimum success rate of a recovery strategy in recommendations.
    pub recovery_success_cutoff: f64,
    /// Minimum confidence of an adapted threshold in recommendations.
    pub threshold_confidence_cutoff: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            context_window_secs: defaults::DEFAULT_CONTEXT_WINDOW_SECS,
            min_samples: defaults::DEFAULT_MIN_SAMPLES,
            pattern_window_secs: defaults::DEFAULT_PATTERN_WINDOW_SECS,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            threshold_change_ratio: defaults::DEFAULT_THRESHOLD_CHANGE_RATIO,
            min_recovery_attempts: defaults::DEFAULT_MIN_RECOVERY_ATTEMPTS,
            context_confidence_cutoff: defaults::DEFAULT_CONTEXT_CONFIDENCE_CUTOFF,
            recovery_success_cutoff: defaults::DEFAULT_RECOVERY_SUCCESS_CUTOFF,
            threshold_confidence_cutoff: defaults::DEFAULT_THRESHOLD_CONFIDENCE_CUTOFF,
        }
    }
}
