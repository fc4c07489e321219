/// Buffer manager errors: ingestion, log files, rotation, persistence.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("invalid event: {reason}")]
    InvalidEvent { reason: String },

    #[error("log write to {path} failed: {reason}")]
    LogWrite { path: String, reason: String },

    #[error("rotation of {path} failed: {reason}")]
    Rotation { path: String, reason: String },

    #[error("compression of {path} failed: {reason}")]
    Compression { path: String, reason: String },

    #[error("persisting state to {path} failed: {reason}")]
    Persistence { path: String, reason: String },

    #[error("state file {path} is corrupt: {reason}")]
    StateCorrupt { path: String, reason: String },

    #[error("batch sink rejected {size} events: {reason}")]
    SinkFailed { size: usize, reason: String },
}
