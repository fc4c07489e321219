use std::collections::BTreeMap;

use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::{time, ErrorEvent};

use super::{offset, IPredictionModel, PredictionCandidate};
use crate::history::EventHistory;
use crate::prediction::PredictionKind;

const MIN_TRANSITIONS: usize = 3;
const CONFIDENCE_CAP: f64 = 0.8;

/// Predicts the module that most often fails right after the trigger's module.
pub struct SequenceModel;

impl SequenceModel {
    /// Counts of `from → to` module transitions between consecutive events no
    /// further apart than `window_ms`.
    pub fn transitions_from(
        history: &EventHistory,
        from: &str,
        window_ms: i64,
    ) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let mut previous: Option<&ErrorEvent> = None;
        for event in history.iter() {
            if let Some(prev) = previous {
                let gap = event.timestamp - prev.timestamp;
                if prev.module == from
                    && event.module != from
                    && (0..=window_ms).contains(&gap)
                {
                    *counts.entry(event.module.clone()).or_insert(0) += 1;
                }
            }
            previous = Some(&**event);
        }
        counts
    }
}

impl IPredictionModel for SequenceModel {
    fn name(&self) -> &str {
        "sequence"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Sequence
    }

    fn predict(
        &self,
        trigger: &ErrorEvent,
        history: &EventHistory,
        config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        let counts = Self::transitions_from(
            history,
            &trigger.module,
            time::secs_to_ms(config.sequence_window_secs),
        );
        let total: usize = counts.values().sum();
        // Ties go to the smallest module name.
        let Some((next, count)) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        else {
            return Ok(None);
        };
        if *count < MIN_TRANSITIONS {
            return Ok(None);
        }

        Ok(Some(PredictionCandidate {
            kind: PredictionKind::Sequence,
            module: next.clone(),
            expected_at: offset(
                self.name(),
                trigger.timestamp,
                time::secs_to_ms(config.sequence_delay_secs),
            )?,
            confidence: (*count as f64 / total as f64).min(CONFIDENCE_CAP),
            model: self.name().to_string(),
            expected_severity: None,
            expected_category: None,
        }))
    }
}
