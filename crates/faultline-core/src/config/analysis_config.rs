use serde::{Deserialize, Serialize};

use super::defaults;

/// Pattern analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Occurrences required before a group becomes a pattern.
    pub min_occurrences: usize,
    /// Temporal pattern windows (seconds).
    pub temporal_windows_secs: Vec<u64>,
    /// Two events closer than this are correlated (seconds).
    pub correlation_window_secs: u64,
    /// Correlations unseen for longer than this are pruned (seconds).
    pub correlation_max_age_secs: u64,
    /// Trailing window used for trend analysis (seconds).
    pub trend_window_secs: u64,
    /// Number of equal segments the trend window is split into.
    pub trend_segments: usize,
    /// Pattern table ceiling.
    pub max_patterns: usize,
    /// Interval between trend/anomaly runs (seconds).
    pub analysis_interval_secs: u64,
    /// Events retained for windowed analysis.
    pub history_capacity: usize,
    /// Anomalies retained for reporting.
    pub max_anomalies: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_occurrences: defaults::DEFAULT_MIN_OCCURRENCES,
            temporal_windows_secs: defaults::DEFAULT_TEMPORAL_WINDOWS_SECS.to_vec(),
            correlation_window_secs: defaults::DEFAULT_CORRELATION_WINDOW_SECS,
            correlation_max_age_secs: defaults::DEFAULT_CORRELATION_MAX_AGE_SECS,
            trend_window_secs: defaults::DEFAULT_TREND_WINDOW_SECS,
            trend_segments: defaults::DEFAULT_TREND_SEGMENTS,
            max_patterns: defaults::DEFAULT_MAX_PATTERNS,
            analysis_interval_secs: defaults::DEFAULT_ANALYSIS_INTERVAL_SECS,
            history_capacity: defaults::DEFAULT_ANALYSIS_HISTORY_CAPACITY,
            max_anomalies: defaults::DEFAULT_MAX_ANOMALIES,
        }
    }
}
