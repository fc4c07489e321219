use std::sync::Arc;

use crate::errors::FaultlineResult;
use crate::event::ErrorEvent;

/// External sink receiving batches of events drained from the temporal buffer.
pub trait IBatchSink: Send + Sync {
    fn process_batch(&self, batch: &[Arc<ErrorEvent>]) -> FaultlineResult<()>;
}
