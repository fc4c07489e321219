//! The error event model: severities, raw inputs, classified records, immutable events.

pub mod context;
pub mod error_event;
pub mod input;
pub mod severity;

pub use context::{ExecutionContext, RecoveryAttempt};
pub use error_event::{ErrorEvent, MemorySnapshot};
pub use input::{ErrorInput, ErrorRecord};
pub use severity::Severity;

/// Arbitrary event metadata (category, source, caller-defined keys).
pub type Metadata = serde_json::Map<String, serde_json::Value>;
