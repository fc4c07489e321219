use serde::{Deserialize, Serialize};

use super::defaults;

/// Classification service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Sliding duplicate window in seconds.
    pub duplicate_window_secs: u64,
    /// Token-Jaccard similarity at or above which two messages are duplicates.
    pub similarity_threshold: f64,
    /// Maximum cached classifications before the oldest 20% are evicted.
    pub cache_max_entries: usize,
    /// Drop duplicates before they reach the buffer instead of tagging them.
    pub suppress_duplicates: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            duplicate_window_secs: defaults::DEFAULT_DUPLICATE_WINDOW_SECS,
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            cache_max_entries: defaults::DEFAULT_CLASSIFICATION_CACHE_SIZE,
            suppress_duplicates: defaults::DEFAULT_SUPPRESS_DUPLICATES,
        }
    }
}
