//! Buffer statistics: persisted counters plus live gauges.

use std::collections::BTreeMap;

use faultline_core::ErrorEvent;
use serde::{Deserialize, Serialize};

/// Running counters. Persisted with the buffer state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferCounters {
    pub total_errors: u64,
    pub by_severity: BTreeMap<String, u64>,
    pub by_module: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub failed_ingestions: u64,
    pub log_write_failures: u64,
    pub bytes_written: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
    pub last_rotation: Option<i64>,
    pub flushed_batches: u64,
    pub sink_failures: u64,
    pub last_persisted: Option<i64>,
    pub persistence_failures: u64,
}

impl BufferCounters {
    pub fn record(&mut self, event: &ErrorEvent) {
        self.total_errors += 1;
        *self
            .by_severity
            .entry(event.severity.as_str().to_string())
            .or_default() += 1;
        *self.by_module.entry(event.module.clone()).or_default() += 1;
        *self
            .by_category
            .entry(event.category().to_string())
            .or_default() += 1;
    }
}

/// Snapshot returned by `BufferManager::stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStats {
    pub counters: BufferCounters,
    pub main_size: usize,
    pub main_capacity: usize,
    pub recent_size: usize,
    pub priority_size: usize,
    pub temporal_pending: usize,
    pub indexed_modules: usize,
    pub indexed_hours: usize,
    pub rotation_pending: bool,
    pub file_logging: bool,
}
