use std::path::PathBuf;

use faultline_core::{Alert, Severity};
use faultline_patterns::Anomaly;
use faultline_prediction::Prediction;
use serde::Serialize;

/// Typed notifications broadcast by the pipeline to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Ingested {
        id: String,
        module: String,
        severity: Severity,
        category: String,
    },
    Duplicate {
        id: String,
        module: String,
    },
    /// A duplicate dropped before buffering (`classification.suppress_duplicates`).
    Suppressed {
        module: String,
        content_hash: String,
    },
    PredictionCreated {
        prediction: Prediction,
    },
    AlertRaised {
        alert: Alert,
    },
    PredictionResolved {
        prediction: Prediction,
    },
    AnomalyDetected {
        anomaly: Anomaly,
    },
    LogRotated {
        archive: PathBuf,
    },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ingested { .. } => "ingested",
            Self::Duplicate { .. } => "duplicate",
            Self::Suppressed { .. } => "suppressed",
            Self::PredictionCreated { .. } => "prediction_created",
            Self::AlertRaised { .. } => "alert_raised",
            Self::PredictionResolved { .. } => "prediction_resolved",
            Self::AnomalyDetected { .. } => "anomaly_detected",
            Self::LogRotated { .. } => "log_rotated",
        }
    }
}
