use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::time::HOUR_MS;
use faultline_core::{numeric, ErrorEvent};

use super::{offset, IPredictionModel, PredictionCandidate};
use crate::history::EventHistory;
use crate::prediction::PredictionKind;

const MIN_EVENTS: usize = 3;
const MAX_EVENTS: usize = 10;
const CONFIDENCE_CAP: f64 = 0.9;

/// Next occurrence at `now + average gap` of the module's recent errors.
pub struct TemporalModel;

impl IPredictionModel for TemporalModel {
    fn name(&self) -> &str {
        "temporal"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Temporal
    }

    fn predict(
        &self,
        trigger: &ErrorEvent,
        history: &EventHistory,
        _config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        let now = trigger.timestamp;
        let mut timestamps: Vec<i64> = history
            .module_between(&trigger.module, now - HOUR_MS, now)
            .map(|e| e.timestamp)
            .collect();
        if timestamps.len() < MIN_EVENTS {
            return Ok(None);
        }
        timestamps.sort_unstable();
        let recent = &timestamps[timestamps.len().saturating_sub(MAX_EVENTS)..];
        let average = numeric::mean(&numeric::intervals(recent));
        let n = recent.len();

        Ok(Some(PredictionCandidate {
            kind: PredictionKind::Temporal,
            module: trigger.module.clone(),
            expected_at: offset(self.name(), now, average.round() as i64)?,
            confidence: (n as f64 / MAX_EVENTS as f64).min(CONFIDENCE_CAP),
            model: self.name().to_string(),
            expected_severity: Some(trigger.severity),
            expected_category: Some(trigger.category().to_string()),
        }))
    }
}
