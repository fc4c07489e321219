//! # faultline-core
//!
//! Foundation crate for the Faultline error pipeline.
//! Defines the event model, config, errors, seam traits, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod models;
pub mod numeric;
pub mod time;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::FaultlineConfig;
pub use errors::{FaultlineError, FaultlineResult};
pub use event::{
    ErrorEvent, ErrorInput, ErrorRecord, ExecutionContext, MemorySnapshot, Metadata,
    RecoveryAttempt, Severity,
};
pub use models::{Alert, AlertSeverity};
