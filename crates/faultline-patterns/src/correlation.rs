//! Pairwise correlations between `module:severity` signatures.

use std::collections::HashMap;

use faultline_core::numeric;
use serde::{Deserialize, Serialize};

/// Gap samples kept per correlation.
const MAX_GAPS: usize = 100;

/// Occurrences at which strength saturates (before consistency weighting).
const SATURATION: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Lexicographically smaller signature.
    pub first: String,
    pub second: String,
    pub occurrences: u64,
    /// Observed gaps between the paired events (ms), most recent last.
    pub gaps_ms: Vec<f64>,
    pub strength: f64,
    pub first_seen: i64,
    pub last_seen: i64,
}

impl Correlation {
    pub fn involves(&self, signature: &str) -> bool {
        self.first == signature || self.second == signature
    }

    /// `1 / (1 + stddev/mean)` over the observed gaps; 1 when the mean gap is 0.
    pub fn consistency(&self) -> f64 {
        consistency(&self.gaps_ms)
    }
}

pub fn consistency(gaps: &[f64]) -> f64 {
    let mean = numeric::mean(gaps);
    if mean == 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + numeric::std_dev(gaps) / mean)
}

/// `min(1, occurrences/10 × consistency)`.
pub fn strength(occurrences: u64, gaps: &[f64]) -> f64 {
    (occurrences as f64 / SATURATION * consistency(gaps)).min(1.0)
}

/// Order-independent pair key.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorrelationTracker {
    entries: HashMap<(String, String), Correlation>,
}

impl CorrelationTracker {
    /// Record one co-occurrence of two distinct signatures `gap_ms` apart.
    pub fn observe(&mut self, a: &str, b: &str, gap_ms: i64, at: i64) {
        let key = pair_key(a, b);
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Correlation {
                first: key.0,
                second: key.1,
                occurrences: 0,
                gaps_ms: Vec::new(),
                strength: 0.0,
                first_seen: at,
                last_seen: at,
            });
        entry.occurrences += 1;
        entry.gaps_ms.push(gap_ms.unsigned_abs() as f64);
        if entry.gaps_ms.len() > MAX_GAPS {
            entry.gaps_ms.remove(0);
        }
        entry.last_seen = entry.last_seen.max(at);
        entry.strength = strength(entry.occurrences, &entry.gaps_ms);
    }

    /// Drop correlations last seen before `cutoff`.
    pub fn prune_before(&mut self, cutoff: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, c| c.last_seen >= cutoff);
        before - self.entries.len()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<&Correlation> {
        self.entries.get(&pair_key(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correlation> + '_ {
        self.entries.values()
    }

    /// Correlations at or above `min_strength`, strongest first.
    pub fn strong(&self, min_strength: f64) -> Vec<Correlation> {
        let mut strong: Vec<Correlation> = self
            .entries
            .values()
            .filter(|c| c.strength >= min_strength)
            .cloned()
            .collect();
        strong.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        strong
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
