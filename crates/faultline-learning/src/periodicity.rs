//! Periodicity learning per `{module, severity}`.

use std::collections::VecDeque;

use faultline_core::{numeric, time, Severity};
use serde::{Deserialize, Serialize};

const CONFIDENCE_CAP: f64 = 0.95;
const CONFIDENCE_SAMPLES: f64 = 20.0;

/// Learned recurrence of one `{module, severity}` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub module: String,
    pub severity: Severity,
    pub samples: usize,
    /// Mean gap between occurrences (ms).
    pub mean_interval_ms: f64,
    /// Variance of the gaps (ms²).
    pub interval_variance: f64,
    /// Hours of day (UTC) with the highest occurrence count.
    pub peak_hours: Vec<u32>,
    /// Peak-hour count over total samples.
    pub periodicity_strength: f64,
    pub confidence: f64,
    pub updated_at: i64,
}

/// Occurrence timestamps of one key within the trailing window.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceSeries {
    timestamps: VecDeque<i64>,
    learned: Option<LearnedPattern>,
}

impl OccurrenceSeries {
    pub fn observe(
        &mut self,
        module: &str,
        severity: Severity,
        timestamp: i64,
        window_ms: i64,
        min_samples: usize,
    ) -> Option<&LearnedPattern> {
        // Replayed events may arrive out of order.
        let at = self.timestamps.partition_point(|t| *t <= timestamp);
        self.timestamps.insert(at, timestamp);
        let newest = self.timestamps.back().copied().unwrap_or(timestamp);
        self.prune(newest - window_ms);

        if self.timestamps.len() >= min_samples {
            self.learned = Some(self.compute(module, severity, newest));
        }
        self.learned.as_ref()
    }

    pub fn prune(&mut self, cutoff: i64) {
        while self.timestamps.front().is_some_and(|t| *t < cutoff) {
            self.timestamps.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn learned(&self) -> Option<&LearnedPattern> {
        self.learned.as_ref()
    }

    fn compute(&self, module: &str, severity: Severity, now: i64) -> LearnedPattern {
        let timestamps: Vec<i64> = self.timestamps.iter().copied().collect();
        let gaps = numeric::intervals(&timestamps);

        let mut hours = [0usize; 24];
        for ts in &timestamps {
            hours[time::hour_of_day(*ts) as usize % 24] += 1;
        }
        let peak = hours.iter().copied().max().unwrap_or(0);
        let peak_hours = (0u32..24).filter(|h| hours[*h as usize] == peak).collect();

        let n = timestamps.len();
        LearnedPattern {
            module: module.to_string(),
            severity,
            samples: n,
            mean_interval_ms: numeric::mean(&gaps),
            interval_variance: numeric::variance(&gaps),
            peak_hours,
            periodicity_strength: if n == 0 { 0.0 } else { peak as f64 / n as f64 },
            confidence: (n as f64 / CONFIDENCE_SAMPLES).min(CONFIDENCE_CAP),
            updated_at: now,
        }
    }
}
