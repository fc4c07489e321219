use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot returned by `PatternAnalyzer::stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub events_processed: u64,
    pub history_size: usize,
    pub patterns: usize,
    pub patterns_by_kind: BTreeMap<String, usize>,
    pub patterns_evicted: u64,
    pub correlations: usize,
    pub strong_correlations: usize,
    pub anomalies: usize,
    pub analysis_failures: u64,
    pub last_trend_run: Option<i64>,
    pub last_anomaly_run: Option<i64>,
}
