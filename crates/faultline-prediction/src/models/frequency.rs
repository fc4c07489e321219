use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::time::{DAY_MS, HOUR_MS};
use faultline_core::ErrorEvent;

use super::{offset, IPredictionModel, PredictionCandidate};
use crate::history::EventHistory;
use crate::prediction::PredictionKind;

const MIN_EVENTS: usize = 5;
const CONFIDENCE_CAP: f64 = 0.8;
const MIN_CONFIDENCE: f64 = 0.5;

/// Next occurrence at `now + 1/rate`, rate being errors per hour over the
/// observed span (at least one hour) of the last 24 h.
pub struct FrequencyModel;

impl IPredictionModel for FrequencyModel {
    fn name(&self) -> &str {
        "frequency"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Frequency
    }

    fn predict(
        &self,
        trigger: &ErrorEvent,
        history: &EventHistory,
        _config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        let now = trigger.timestamp;
        let timestamps: Vec<i64> = history
            .module_between(&trigger.module, now - DAY_MS, now)
            .map(|e| e.timestamp)
            .collect();
        let n = timestamps.len();
        if n < MIN_EVENTS {
            return Ok(None);
        }
        let confidence = (n as f64 / 20.0).min(CONFIDENCE_CAP);
        if confidence < MIN_CONFIDENCE {
            return Ok(None);
        }

        let oldest = timestamps.iter().copied().min().unwrap_or(now);
        let span_hours = ((now - oldest) as f64 / HOUR_MS as f64).max(1.0);
        let rate_per_hour = n as f64 / span_hours;
        let gap_ms = (HOUR_MS as f64 / rate_per_hour).round() as i64;

        Ok(Some(PredictionCandidate {
            kind: PredictionKind::Frequency,
            module: trigger.module.clone(),
            expected_at: offset(self.name(), now, gap_ms)?,
            confidence,
            model: self.name().to_string(),
            expected_severity: None,
            expected_category: None,
        }))
    }
}
