//! Statistical anomaly rules: volume spikes, runaway patterns, noisy modules.

use std::collections::BTreeMap;

use faultline_core::{numeric, time};
use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::pattern::{PatternDetail, PatternKind};
use crate::table::PatternTable;

pub const SPIKE_BUCKETS: usize = 12;
pub const SPIKE_BUCKET_MS: i64 = 5 * time::MINUTE_MS;
const SPIKE_SIGMA: f64 = 2.0;
const SPIKE_MIN_COUNT: usize = 5;

const TEMPORAL_FREQUENCY_LIMIT: f64 = 10.0;
const MESSAGE_COUNT_LIMIT: usize = 50;
const MODULE_TOTAL_LIMIT: usize = 100;

const MODULE_SIGMA: f64 = 1.5;
const MODULE_MIN_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Spike,
    Pattern,
    Module,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Bucket start time, pattern key or module name.
    pub subject: String,
    pub observed: f64,
    pub threshold: f64,
    pub detected_at: i64,
    pub description: String,
}

/// Event counts in the twelve five-minute buckets of the hour ending at `now`.
pub fn bucket_counts(history: &History, now: i64) -> [usize; SPIKE_BUCKETS] {
    let start = now - SPIKE_BUCKET_MS * SPIKE_BUCKETS as i64;
    let mut counts = [0usize; SPIKE_BUCKETS];
    for o in history.iter() {
        let ts = o.event.timestamp;
        if ts < start || ts > now {
            continue;
        }
        let slot = (((ts - start) / SPIKE_BUCKET_MS) as usize).min(SPIKE_BUCKETS - 1);
        counts[slot] += 1;
    }
    counts
}

/// Indices of buckets above `mean + 2σ` holding more than five events.
pub fn spike_buckets(counts: &[usize]) -> Vec<(usize, f64)> {
    let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
    let threshold = numeric::mean(&values) + SPIKE_SIGMA * numeric::std_dev(&values);
    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > SPIKE_MIN_COUNT && **c as f64 > threshold)
        .map(|(i, _)| (i, threshold))
        .collect()
}

pub fn spikes(history: &History, now: i64) -> Vec<Anomaly> {
    let counts = bucket_counts(history, now);
    let start = now - SPIKE_BUCKET_MS * SPIKE_BUCKETS as i64;
    spike_buckets(&counts)
        .into_iter()
        .map(|(i, threshold)| {
            let bucket_start = start + SPIKE_BUCKET_MS * i as i64;
            Anomaly {
                kind: AnomalyKind::Spike,
                subject: time::to_rfc3339(bucket_start),
                observed: counts[i] as f64,
                threshold,
                detected_at: now,
                description: format!(
                    "{} errors in the 5-minute bucket starting {}",
                    counts[i],
                    time::to_rfc3339(bucket_start)
                ),
            }
        })
        .collect()
}

pub fn anomalous_patterns(table: &PatternTable, now: i64) -> Vec<Anomaly> {
    let mut found = Vec::new();
    for pattern in table.values() {
        let (observed, threshold, what) = match (&pattern.detail, pattern.key.kind) {
            (PatternDetail::Temporal { frequency_per_min, .. }, PatternKind::Temporal) => {
                (*frequency_per_min, TEMPORAL_FREQUENCY_LIMIT, "errors/minute")
            }
            (PatternDetail::Message { count, .. }, PatternKind::Message) => {
                (*count as f64, MESSAGE_COUNT_LIMIT as f64, "occurrences")
            }
            (PatternDetail::Module { total, .. }, PatternKind::Module) => {
                (*total as f64, MODULE_TOTAL_LIMIT as f64, "errors")
            }
            _ => continue,
        };
        if observed > threshold {
            found.push(Anomaly {
                kind: AnomalyKind::Pattern,
                subject: pattern.key.to_string(),
                observed,
                threshold,
                detected_at: now,
                description: format!("pattern {} at {observed:.1} {what}", pattern.key),
            });
        }
    }
    found.sort_by(|a, b| a.subject.cmp(&b.subject));
    found
}

/// Modules whose trailing-hour count exceeds `mean + 1.5σ` across modules
/// and 10.
pub fn anomalous_modules(history: &History, now: i64) -> Vec<Anomaly> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for o in history.between(now - time::HOUR_MS, now) {
        *counts.entry(o.event.module.as_str()).or_default() += 1;
    }
    let values: Vec<f64> = counts.values().map(|c| *c as f64).collect();
    let threshold = numeric::mean(&values) + MODULE_SIGMA * numeric::std_dev(&values);

    counts
        .into_iter()
        .filter(|(_, c)| *c > MODULE_MIN_COUNT && *c as f64 > threshold)
        .map(|(module, c)| Anomaly {
            kind: AnomalyKind::Module,
            subject: module.to_string(),
            observed: c as f64,
            threshold,
            detected_at: now,
            description: format!("module {module} logged {c} errors in the last hour"),
        })
        .collect()
}
