//! # faultline-prediction
//!
//! Forecasts which module will fail next, raises alerts for confident forecasts
//! and scores forecasts against the errors that actually arrive.
//!
//! ## 4 Prediction Models
//!
//! | Model | Signal | Confidence |
//! |-------|--------|------------|
//! | Temporal | Average gap of the last 10 same-module errors in the trailing hour | `min(n/10, 0.9)` |
//! | Frequency | Hourly rate of same-module errors over 24 h | `min(n/20, 0.8)`, dropped below 0.5 |
//! | Sequence | Most frequent module transition out of the trigger's module | share of transitions, cap 0.8 |
//! | Cascade | Error rate and module spread of the active 5-minute sequence | risk, cap 0.95 |
//!
//! ## Merging
//!
//! An active prediction of the same kind and module whose expected time is within
//! the merge window absorbs a new one: confidence and expected time are averaged
//! and the reinforcement counter goes up.

pub mod alerting;
pub mod channels;
pub mod engine;
pub mod history;
pub mod models;
pub mod prediction;
pub mod stats;

pub use alerting::{alert_for, band_for, time_to_error};
pub use channels::{MemoryAlertChannel, TracingAlertChannel};
pub use engine::{PredictionEngine, PredictionOutcome};
pub use history::EventHistory;
pub use models::{IPredictionModel, PredictionCandidate};
pub use prediction::{Prediction, PredictionKind, PredictionStatus};
pub use stats::{ModelStats, PredictionStats};
