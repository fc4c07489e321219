use std::fmt;

use faultline_core::{ErrorEvent, Severity};
use serde::{Deserialize, Serialize};

/// Which model family produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Temporal,
    Frequency,
    Sequence,
    Cascade,
}

impl PredictionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Frequency => "frequency",
            Self::Sequence => "sequence",
            Self::Cascade => "cascade",
        }
    }
}

impl fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Active,
    Fulfilled,
    Expired,
}

/// A confidence-scored forecast that `module` will fail around `expected_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub kind: PredictionKind,
    pub module: String,
    /// Epoch ms.
    pub expected_at: i64,
    pub confidence: f64,
    /// Name of the model that produced it.
    pub model: String,
    pub status: PredictionStatus,
    /// `1 − |Δ|/window` once fulfilled.
    pub accuracy: Option<f64>,
    /// Times a matching prediction was merged into this one.
    pub reinforcements: u32,
    pub expected_severity: Option<Severity>,
    pub expected_category: Option<String>,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    /// Event that triggered the prediction.
    pub trigger_id: String,
}

impl Prediction {
    pub fn is_active(&self) -> bool {
        self.status == PredictionStatus::Active
    }

    /// Whether `actual` is the kind of error this prediction forecasts.
    pub fn matches(&self, actual: &ErrorEvent) -> bool {
        if actual.module != self.module {
            return false;
        }
        if let Some(category) = &self.expected_category {
            if actual.category() != category {
                return false;
            }
        }
        self.expected_severity
            .map_or(true, |expected| actual.severity >= expected)
    }

    pub(crate) fn fulfill(&mut self, at: i64, accuracy: f64) {
        self.status = PredictionStatus::Fulfilled;
        self.accuracy = Some(accuracy.clamp(0.0, 1.0));
        self.resolved_at = Some(at);
    }

    pub(crate) fn expire(&mut self, at: i64) {
        self.status = PredictionStatus::Expired;
        self.resolved_at = Some(at);
    }
}
