//! Rolling trend classification over equal time segments.

use std::collections::BTreeMap;

use faultline_core::errors::AnalysisError;
use serde::{Deserialize, Serialize};

use crate::history::History;

/// Share of segment-to-segment deltas that must agree for a directional trend.
pub const MAJORITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify a count series by its segment-to-segment deltas.
    pub fn classify(counts: &[usize]) -> Self {
        let deltas: Vec<i64> = counts
            .windows(2)
            .map(|w| w[1] as i64 - w[0] as i64)
            .collect();
        if deltas.is_empty() {
            return Self::Stable;
        }
        let n = deltas.len() as f64;
        let up = deltas.iter().filter(|d| **d > 0).count() as f64;
        let down = deltas.iter().filter(|d| **d < 0).count() as f64;
        if up / n >= MAJORITY {
            Self::Increasing
        } else if down / n >= MAJORITY {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub key: String,
    /// Event count per segment, oldest first.
    pub counts: Vec<usize>,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub generated_at: i64,
    pub window_ms: i64,
    pub segments: usize,
    pub by_module: Vec<TrendSeries>,
    pub by_severity: Vec<TrendSeries>,
}

impl TrendReport {
    pub fn module(&self, module: &str) -> Option<&TrendSeries> {
        self.by_module.iter().find(|s| s.key == module)
    }

    pub fn severity(&self, severity: &str) -> Option<&TrendSeries> {
        self.by_severity.iter().find(|s| s.key == severity)
    }
}

/// Split `(now - window, now]` into `segments` equal slices and count events per
/// module and per severity.
pub fn analyze(
    history: &History,
    now: i64,
    window_ms: i64,
    segments: usize,
) -> Result<TrendReport, AnalysisError> {
    if segments == 0 || window_ms <= 0 {
        return Err(AnalysisError::InvalidWindow {
            reason: format!("window {window_ms}ms with {segments} segments"),
        });
    }
    let start = now - window_ms;
    let segment_ms = (window_ms as f64 / segments as f64).max(1.0);

    let mut modules: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut severities: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for o in history.iter() {
        let ts = o.event.timestamp;
        if ts <= start || ts > now {
            continue;
        }
        let slot = (((ts - start) as f64 / segment_ms).ceil() as usize)
            .saturating_sub(1)
            .min(segments - 1);
        modules
            .entry(o.event.module.clone())
            .or_insert_with(|| vec![0; segments])[slot] += 1;
        severities
            .entry(o.event.severity.as_str().to_string())
            .or_insert_with(|| vec![0; segments])[slot] += 1;
    }

    let series = |map: BTreeMap<String, Vec<usize>>| -> Vec<TrendSeries> {
        map.into_iter()
            .map(|(key, counts)| TrendSeries {
                direction: TrendDirection::classify(&counts),
                key,
                counts,
            })
            .collect()
    };

    Ok(TrendReport {
        generated_at: now,
        window_ms,
        segments,
        by_module: series(modules),
        by_severity: series(severities),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_of_deltas_decides_direction() {
        assert_eq!(
            TrendDirection::classify(&[1, 2, 3, 4, 4, 5]),
            TrendDirection::Increasing
        );
        assert_eq!(
            TrendDirection::classify(&[5, 4, 3, 3, 2, 1]),
            TrendDirection::Decreasing
        );
        assert_eq!(
            TrendDirection::classify(&[1, 3, 1, 3, 1]),
            TrendDirection::Stable
        );
        assert_eq!(TrendDirection::classify(&[7]), TrendDirection::Stable);
    }
}
