//! Adaptive per-module error-rate thresholds.

use std::collections::VecDeque;

use faultline_core::time::HOUR_MS;
use serde::{Deserialize, Serialize};

const CONFIDENCE_SAMPLES: f64 = 100.0;

/// Learned error rate of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThreshold {
    pub module: String,
    /// Learned errors per hour.
    pub rate_per_hour: f64,
    /// Rate observed at the last update.
    pub observed_rate: f64,
    pub samples: u64,
    pub adjustments: u64,
    pub confidence: f64,
    pub updated_at: i64,
}

impl AdaptiveThreshold {
    /// Whether a current rate exceeds the learned one.
    pub fn is_exceeded_by(&self, rate: f64) -> bool {
        rate > self.rate_per_hour
    }
}

/// Trailing-hour occurrence window of one module plus its threshold.
#[derive(Debug, Clone)]
pub struct RateTracker {
    occurrences: VecDeque<i64>,
    threshold: AdaptiveThreshold,
}

impl RateTracker {
    pub fn new(module: &str) -> Self {
        Self {
            occurrences: VecDeque::new(),
            threshold: AdaptiveThreshold {
                module: module.to_string(),
                rate_per_hour: 0.0,
                observed_rate: 0.0,
                samples: 0,
                adjustments: 0,
                confidence: 0.0,
                updated_at: 0,
            },
        }
    }

    /// Record one occurrence and adapt. Returns whether the stored rate moved.
    pub fn observe(&mut self, timestamp: i64, change_ratio: f64, learning_rate: f64) -> bool {
        self.occurrences.push_back(timestamp);
        self.prune(timestamp - HOUR_MS);
        let observed = self.rate_at(timestamp);

        let t = &mut self.threshold;
        t.samples += 1;
        t.observed_rate = observed;
        t.updated_at = timestamp;
        t.confidence = (t.samples as f64 / CONFIDENCE_SAMPLES).min(1.0);

        let adjusted = if t.rate_per_hour <= 0.0 {
            t.rate_per_hour = observed;
            true
        } else if (observed - t.rate_per_hour).abs() / t.rate_per_hour > change_ratio {
            t.rate_per_hour += learning_rate * (observed - t.rate_per_hour);
            true
        } else {
            false
        };
        if adjusted {
            t.adjustments += 1;
        }
        adjusted
    }

    /// Occurrences in the hour ending at `now`.
    pub fn rate_at(&self, now: i64) -> f64 {
        self.occurrences
            .iter()
            .filter(|ts| **ts > now - HOUR_MS && **ts <= now)
            .count() as f64
    }

    pub fn prune(&mut self, cutoff: i64) {
        while self.occurrences.front().is_some_and(|t| *t <= cutoff) {
            self.occurrences.pop_front();
        }
    }

    pub fn threshold(&self) -> &AdaptiveThreshold {
        &self.threshold
    }
}
