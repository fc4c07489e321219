//! Prediction models. Each is independent; the engine skips a model that fails.

pub mod cascade;
pub mod frequency;
pub mod sequence;
pub mod temporal;

pub use cascade::CascadeModel;
pub use frequency::FrequencyModel;
pub use sequence::SequenceModel;
pub use temporal::TemporalModel;

use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::{ErrorEvent, Severity};
use serde::{Deserialize, Serialize};

use crate::history::EventHistory;
use crate::prediction::PredictionKind;

/// Raw output of a model before validation and merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCandidate {
    pub kind: PredictionKind,
    pub module: String,
    pub expected_at: i64,
    pub confidence: f64,
    pub model: String,
    pub expected_severity: Option<Severity>,
    pub expected_category: Option<String>,
}

/// A prediction model. `history` already contains `trigger`.
pub trait IPredictionModel: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> PredictionKind;

    fn predict(
        &self,
        trigger: &ErrorEvent,
        history: &EventHistory,
        config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError>;
}

/// The four built-in models.
pub fn default_models() -> Vec<Box<dyn IPredictionModel>> {
    vec![
        Box::new(TemporalModel),
        Box::new(FrequencyModel),
        Box::new(SequenceModel),
        Box::new(CascadeModel),
    ]
}

/// `now + delay_ms`, failing the model instead of wrapping.
pub(crate) fn offset(model: &str, now: i64, delay_ms: i64) -> Result<i64, PredictionError> {
    now.checked_add(delay_ms)
        .ok_or_else(|| PredictionError::ModelFailed {
            model: model.to_string(),
            reason: format!("expected time overflows ({now} + {delay_ms})"),
        })
}
