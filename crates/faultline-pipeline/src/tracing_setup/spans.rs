//! Span definitions per pipeline stage.

/// Create an ingestion span.
#[macro_export]
macro_rules! ingest_span {
    ($module:expr, $severity:expr) => {
        tracing::info_span!("faultline.ingest", module = %$module, severity = %$severity)
    };
}

/// Create a span for one scheduled job run.
#[macro_export]
macro_rules! job_span {
    ($job:expr) => {
        tracing::debug_span!("faultline.job", job = %$job)
    };
}

/// Create a periodic analysis span.
#[macro_export]
macro_rules! analysis_span {
    ($now:expr) => {
        tracing::debug_span!("faultline.analysis", now = $now)
    };
}
