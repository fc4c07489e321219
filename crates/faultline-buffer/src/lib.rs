//! # faultline-buffer
//!
//! Owns all retained error storage.
//!
//! ## Buffers
//!
//! | Buffer | Retention |
//! |--------|-----------|
//! | Main | Circular, fixed capacity, oldest overwritten |
//! | Recent | Age-bounded, pruned on insert |
//! | Priority | Error/critical only, capacity-bounded, sorted by weight then recency |
//! | Temporal | Accumulates until the periodic flush hands it to the batch sink |
//!
//! Every accepted event is also indexed by module, severity, hour and category and
//! appended as one JSON line to the active log file (and to the critical log when
//! critical). Log streams rotate into a compressed archive once they cross a byte
//! ceiling; rotation runs from the periodic check, never from ingestion.

pub mod circular;
pub mod index;
pub mod log;
pub mod manager;
pub mod memory;
pub mod persistence;
pub mod priority;
pub mod recent;
pub mod search;
pub mod sink;
pub mod stats;
pub mod temporal;

pub use circular::CircularBuffer;
pub use index::{ErrorIndexes, IndexKind};
pub use manager::BufferManager;
pub use persistence::PersistedState;
pub use search::{SearchCriteria, SortField, SortOrder};
pub use sink::TracingBatchSink;
pub use stats::{BufferCounters, BufferStats};
