//! Default batch sink.

use std::sync::Arc;

use faultline_core::errors::FaultlineResult;
use faultline_core::traits::IBatchSink;
use faultline_core::ErrorEvent;
use tracing::info;

/// Logs the size and severity mix of each flushed batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBatchSink;

impl IBatchSink for TracingBatchSink {
    fn process_batch(&self, batch: &[Arc<ErrorEvent>]) -> FaultlineResult<()> {
        let priority = batch.iter().filter(|e| e.severity.is_priority()).count();
        info!(
            event = "temporal_batch",
            size = batch.len(),
            priority,
            "processed temporal batch"
        );
        Ok(())
    }
}
