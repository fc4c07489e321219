use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Advice derived from learned knowledge for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    /// The event matches a well-sampled context.
    ContextPattern {
        key: String,
        confidence: f64,
        samples: usize,
        /// Most common value of each categorical feature.
        dominant: BTreeMap<String, String>,
        /// Numeric features whose current value exceeds the learned anomaly threshold.
        unusual: Vec<String>,
    },
    /// Best-known recovery strategy for this module and severity.
    Recovery {
        strategy: String,
        success_rate: f64,
        attempts: u64,
    },
    /// Learned error rate of the module.
    Threshold {
        module: String,
        rate_per_hour: f64,
        current_rate: f64,
        confidence: f64,
        exceeded: bool,
    },
}

impl Recommendation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContextPattern { .. } => "context_pattern",
            Self::Recovery { .. } => "recovery",
            Self::Threshold { .. } => "threshold",
        }
    }
}
