use serde::{Deserialize, Serialize};

/// Learning system counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningStats {
    pub events_learned: u64,
    pub context_groups: usize,
    /// Groups with enough samples to have statistics.
    pub context_patterns: usize,
    pub learned_patterns: usize,
    pub thresholds: usize,
    pub threshold_adjustments: u64,
    pub recovery_keys: usize,
    pub recovery_attempts: u64,
}
