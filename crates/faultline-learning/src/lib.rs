//! # faultline-learning
//!
//! Learns from every classified error and the execution context it happened in.
//!
//! - **Context**: per `{module, severity, category}` feature statistics over a rolling window.
//! - **Periodicity**: per `{module, severity}` interval statistics and peak hours of day.
//! - **Thresholds**: per-module error rate per hour, nudged toward the observed rate.
//! - **Recovery**: per `{module, severity}` strategy success rates.

pub mod context;
pub mod engine;
pub mod features;
pub mod knowledge;
pub mod periodicity;
pub mod recommendation;
pub mod recovery;
pub mod stats;
pub mod thresholds;

pub use context::{CategoricalStats, ContextPattern, NumericStats};
pub use engine::LearningSystem;
pub use knowledge::KnowledgeBase;
pub use periodicity::LearnedPattern;
pub use recommendation::Recommendation;
pub use recovery::StrategyStats;
pub use stats::LearningStats;
pub use thresholds::AdaptiveThreshold;
