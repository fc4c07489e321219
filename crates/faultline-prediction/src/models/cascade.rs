use std::collections::{BTreeMap, BTreeSet};

use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::{time, ErrorEvent};

use super::{offset, IPredictionModel, PredictionCandidate};
use crate::history::EventHistory;
use crate::prediction::PredictionKind;

const RISK_CAP: f64 = 0.95;

/// Risk that the active error sequence spreads to another module.
pub struct CascadeModel;

impl CascadeModel {
    /// `0.3·min(rate/10, 1) + 0.7·min(modules/5, 1)`, capped at 0.95.
    /// `rate` is errors per minute.
    pub fn risk(rate_per_min: f64, modules: usize) -> f64 {
        let rate_factor = (rate_per_min / 10.0).min(1.0);
        let spread_factor = (modules as f64 / 5.0).min(1.0);
        (0.3 * rate_factor + 0.7 * spread_factor).min(RISK_CAP)
    }

    /// Module outside `involved` that most often failed within `window_ms` of
    /// an involved module's error.
    fn related_module(
        history: &EventHistory,
        involved: &BTreeSet<&str>,
        window_ms: i64,
    ) -> Option<String> {
        let mut anchors: Vec<i64> = history
            .iter()
            .filter(|e| involved.contains(e.module.as_str()))
            .map(|e| e.timestamp)
            .collect();
        anchors.sort_unstable();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for event in history.iter() {
            if involved.contains(event.module.as_str()) {
                continue;
            }
            let lo = anchors.partition_point(|t| *t < event.timestamp - window_ms);
            let hi = anchors.partition_point(|t| *t <= event.timestamp + window_ms);
            if hi > lo {
                *counts.entry(event.module.as_str()).or_insert(0) += hi - lo;
            }
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(module, _)| module.to_string())
    }
}

impl IPredictionModel for CascadeModel {
    fn name(&self) -> &str {
        "cascade"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Cascade
    }

    fn predict(
        &self,
        trigger: &ErrorEvent,
        history: &EventHistory,
        config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        let now = trigger.timestamp;
        let window_ms = time::secs_to_ms(config.cascade_window_secs);
        if window_ms <= 0 {
            return Err(PredictionError::ModelFailed {
                model: self.name().to_string(),
                reason: "cascade window must be positive".to_string(),
            });
        }

        let active: Vec<&ErrorEvent> = history
            .between(now - window_ms, now)
            .map(|e| &**e)
            .collect();
        if !active.iter().any(|e| e.id == trigger.id) {
            return Ok(None);
        }
        let involved: BTreeSet<&str> = active.iter().map(|e| e.module.as_str()).collect();
        let window_min = window_ms as f64 / time::MINUTE_MS as f64;
        let risk = Self::risk(active.len() as f64 / window_min, involved.len());
        if risk < config.cascade_risk_threshold {
            return Ok(None);
        }

        let Some(module) = Self::related_module(history, &involved, window_ms) else {
            return Ok(None);
        };
        Ok(Some(PredictionCandidate {
            kind: PredictionKind::Cascade,
            module,
            expected_at: offset(self.name(), now, time::secs_to_ms(config.cascade_delay_secs))?,
            confidence: risk,
            model: self.name().to_string(),
            expected_severity: None,
            expected_category: None,
        }))
    }
}
