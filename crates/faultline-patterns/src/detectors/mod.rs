//! Per-event pattern detectors. Each inspects the history (which already contains
//! the triggering event) and returns fresh observations for the pattern table.

pub mod context;
pub mod message;
pub mod module;
pub mod temporal;

pub use context::ContextDetector;
pub use message::MessageDetector;
pub use module::ModuleDetector;
pub use temporal::TemporalDetector;
