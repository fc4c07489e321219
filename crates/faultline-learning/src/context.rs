//! Context learning: feature statistics per `{module, severity, category}`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use faultline_core::{numeric, Severity};
use serde::{Deserialize, Serialize};

use crate::features::Features;

/// Samples at which the sample-count factor saturates.
const SAMPLE_SATURATION: f64 = 20.0;

/// Statistics of one numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// `mean + 2σ`; values above it are unusual for this context.
    pub anomaly_threshold: f64,
    pub samples: usize,
}

impl NumericStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = numeric::mean(values);
        let std_dev = numeric::std_dev(values);
        Some(Self {
            mean,
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            anomaly_threshold: mean + 2.0 * std_dev,
            samples: values.len(),
        })
    }

    pub fn is_anomalous(&self, value: f64) -> bool {
        value > self.anomaly_threshold
    }
}

/// Statistics of one categorical feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalStats {
    pub distribution: BTreeMap<String, usize>,
    pub mode: String,
    /// Shannon entropy in bits.
    pub entropy: f64,
}

impl CategoricalStats {
    fn from_values<'a>(values: impl Iterator<Item = &'a str>) -> Option<Self> {
        let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
        for value in values {
            *distribution.entry(value.to_string()).or_default() += 1;
        }
        // Ties resolve to the smallest value.
        let mode = distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(value, _)| value.clone())?;
        let entropy = numeric::shannon_entropy(distribution.values().copied());
        Some(Self {
            distribution,
            mode,
            entropy,
        })
    }
}

/// Learned statistics of one context group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPattern {
    pub module: String,
    pub severity: Severity,
    pub category: String,
    pub samples: usize,
    pub numeric: BTreeMap<String, NumericStats>,
    pub categorical: BTreeMap<String, CategoricalStats>,
    pub confidence: f64,
    pub first_seen: i64,
    pub last_seen: i64,
}

impl ContextPattern {
    /// Most common value of every categorical feature.
    pub fn dominant(&self) -> BTreeMap<String, String> {
        self.categorical
            .iter()
            .map(|(key, stats)| (key.clone(), stats.mode.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Sample {
    timestamp: i64,
    severity: Severity,
    features: Features,
}

/// Rolling samples of one `{module, severity, category}` key.
#[derive(Debug, Clone)]
pub struct ContextGroup {
    module: String,
    severity: Severity,
    category: String,
    samples: VecDeque<Sample>,
    learned: Option<ContextPattern>,
}

impl ContextGroup {
    pub fn new(module: &str, severity: Severity, category: &str) -> Self {
        Self {
            module: module.to_string(),
            severity,
            category: category.to_string(),
            samples: VecDeque::new(),
            learned: None,
        }
    }

    pub fn key(module: &str, severity: Severity, category: &str) -> String {
        format!("{module}:{severity}:{category}")
    }

    /// Add a sample, drop samples older than `window_ms` and recompute at `min_samples`.
    pub fn observe(
        &mut self,
        timestamp: i64,
        severity: Severity,
        features: Features,
        window_ms: i64,
        min_samples: usize,
    ) -> Option<&ContextPattern> {
        self.samples.push_back(Sample {
            timestamp,
            severity,
            features,
        });
        self.prune(timestamp - window_ms);
        self.learned = if self.samples.len() >= min_samples {
            Some(self.compute(window_ms))
        } else {
            None
        };
        self.learned.as_ref()
    }

    /// Drop samples older than `cutoff`. The learned pattern is kept.
    pub fn prune(&mut self, cutoff: i64) {
        while self.samples.front().is_some_and(|s| s.timestamp < cutoff) {
            self.samples.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn learned(&self) -> Option<&ContextPattern> {
        self.learned.as_ref()
    }

    fn compute(&self, window_ms: i64) -> ContextPattern {
        let mut numeric_values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut categorical_values: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for sample in &self.samples {
            for (key, value) in &sample.features.numeric {
                numeric_values.entry(key).or_default().push(*value);
            }
            for (key, value) in &sample.features.categorical {
                categorical_values.entry(key).or_default().push(value);
            }
        }

        let numeric = numeric_values
            .into_iter()
            .filter_map(|(key, values)| {
                NumericStats::from_values(&values).map(|s| (key.to_string(), s))
            })
            .collect();
        let categorical = categorical_values
            .into_iter()
            .filter_map(|(key, values)| {
                CategoricalStats::from_values(values.into_iter()).map(|s| (key.to_string(), s))
            })
            .collect();

        let first_seen = self.samples.front().map_or(0, |s| s.timestamp);
        let last_seen = self.samples.back().map_or(0, |s| s.timestamp);
        let distinct: BTreeSet<Severity> = self.samples.iter().map(|s| s.severity).collect();

        ContextPattern {
            module: self.module.clone(),
            severity: self.severity,
            category: self.category.clone(),
            samples: self.samples.len(),
            numeric,
            categorical,
            confidence: context_confidence(
                self.samples.len(),
                last_seen - first_seen,
                window_ms,
                distinct.len(),
            ),
            first_seen,
            last_seen,
        }
    }
}

/// `0.4·sample + 0.3·span + 0.3·(1 − distinct/total)`.
pub fn context_confidence(samples: usize, span_ms: i64, window_ms: i64, distinct: usize) -> f64 {
    if samples == 0 {
        return 0.0;
    }
    let sample_factor = (samples as f64 / SAMPLE_SATURATION).min(1.0);
    let span_factor = if window_ms > 0 {
        (span_ms.max(0) as f64 / window_ms as f64).min(1.0)
    } else {
        0.0
    };
    let consistency = 1.0 - distinct as f64 / samples as f64;
    0.4 * sample_factor + 0.3 * span_factor + 0.3 * consistency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_saturates_at_one() {
        let c = context_confidence(1_000, 3_600_000, 3_600_000, 0);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn categorical_mode_prefers_smallest_on_tie() {
        let stats = CategoricalStats::from_values(["b", "a", "b", "a"].into_iter()).unwrap();
        assert_eq!(stats.mode, "a");
        assert!((stats.entropy - 1.0).abs() < 1e-12);
    }
}
