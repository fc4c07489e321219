use std::sync::Arc;

use faultline_buffer::BufferStats;
use faultline_classification::{Classification, ClassificationStats};
use faultline_core::{Alert, ErrorEvent};
use faultline_learning::LearningStats;
use faultline_patterns::{AnalysisStats, PatternKey};
use faultline_prediction::{Prediction, PredictionStats};
use serde::Serialize;

/// Everything one submission produced.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub event: Arc<ErrorEvent>,
    pub classification: Classification,
    /// Patterns created or updated by this event.
    pub patterns: Vec<PatternKey>,
    /// Earlier predictions resolved by this event.
    pub resolved: Vec<Prediction>,
    /// Predictions created or reinforced by this event.
    pub predictions: Vec<Prediction>,
    pub alerts: Vec<Alert>,
}

/// Combined stats of every component, for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub buffer: BufferStats,
    pub classification: ClassificationStats,
    pub analysis: AnalysisStats,
    pub learning: LearningStats,
    pub prediction: PredictionStats,
}
