//! # faultline-pipeline
//!
//! The top-level [`ErrorPipeline`] owns one instance of every component and
//! drives each submitted error through them in a fixed order:
//!
//! | Step | Component | Effect |
//! |------|-----------|--------|
//! | 1 | Classification | severity, category, tags, duplicate flag |
//! | 2 | Buffer | buffers, indexes, JSON-lines log |
//! | 3 | Prediction | verify outstanding predictions |
//! | 4 | Patterns | pattern detection, correlations |
//! | 5 | Learning | context statistics, thresholds, recovery |
//! | 6 | Prediction | new/merged predictions, alerts |
//!
//! Periodic work (temporal flush, persistence, rotation, maintenance, analysis,
//! prediction expiry) runs on a tokio [`scheduler`] started with
//! [`ErrorPipeline::start`].

pub mod context;
pub mod notifications;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod tracing_setup;

pub use context::SystemContextSupplier;
pub use notifications::PipelineEvent;
pub use pipeline::ErrorPipeline;
pub use report::{IngestReport, PipelineStats};
pub use scheduler::{Job, SchedulerHandle};
