/// Classification service errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("rule table '{table}' is unavailable")]
    RulesUnavailable { table: String },

    #[error("unknown severity: {value}")]
    UnknownSeverity { value: String },

    #[error("duplicate of a recent error suppressed (content hash {content_hash})")]
    DuplicateSuppressed { content_hash: String },
}
