//! # faultline-patterns
//!
//! Scans incoming error events for recurring structure and statistical outliers.
//!
//! ## Pattern kinds
//!
//! | Kind | Scope | Recorded |
//! |------|-------|----------|
//! | Temporal | window + module | count, events/minute, last 5 event ids |
//! | Module | module | message and severity frequency, most frequent message |
//! | Message | normalized message hash | count, mean interval, modules |
//! | Context | metadata `key=value` | count, modules, severities |
//!
//! Per-event work (`process_event`) covers patterns and correlations. Trends and
//! anomalies are computed by the periodic `analyze_trends` / `detect_anomalies`.

pub mod analyzer;
pub mod anomaly;
pub mod correlation;
pub mod detectors;
pub mod history;
pub mod normalize;
pub mod pattern;
pub mod stats;
pub mod table;
pub mod trends;

pub use analyzer::{PatternAnalyzer, ProcessOutcome};
pub use anomaly::{Anomaly, AnomalyKind};
pub use correlation::{Correlation, CorrelationTracker};
pub use pattern::{Pattern, PatternDetail, PatternKey, PatternKind};
pub use stats::AnalysisStats;
pub use trends::{TrendDirection, TrendReport, TrendSeries};
