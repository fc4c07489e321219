use serde::{Deserialize, Serialize};

use super::{Metadata, Severity};
use crate::constants;
use crate::time;

/// Memory usage sampled when an event is enriched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Resident memory of this process in bytes.
    pub process_bytes: u64,
    /// Memory in use system-wide in bytes.
    pub system_used_bytes: u64,
}

/// One structured, immutable occurrence of an application error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub module: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub memory: MemorySnapshot,
}

impl ErrorEvent {
    /// Category resolved by classification, `"general"` if absent.
    pub fn category(&self) -> &str {
        self.metadata
            .get(constants::CATEGORY_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or(constants::DEFAULT_CATEGORY)
    }

    /// `module:severity` signature used for correlations.
    pub fn signature(&self) -> String {
        format!("{}:{}", self.module, self.severity)
    }

    /// Hour bucket key (`YYYY-MM-DDTHH`) in UTC.
    pub fn hour_bucket(&self) -> String {
        time::hour_bucket(self.timestamp)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether classification flagged this event as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        self.metadata
            .get(constants::DUPLICATE_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
