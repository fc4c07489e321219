//! Aggregation buffer drained in fixed-size batches by the periodic flush.

use std::sync::Arc;

use faultline_core::ErrorEvent;

#[derive(Debug, Clone, Default)]
pub struct TemporalBuffer {
    pending: Vec<Arc<ErrorEvent>>,
}

impl TemporalBuffer {
    pub fn push(&mut self, event: Arc<ErrorEvent>) {
        self.pending.push(event);
    }

    /// Take everything pending, split into batches of at most `batch_size`.
    pub fn drain_batches(&mut self, batch_size: usize) -> Vec<Vec<Arc<ErrorEvent>>> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .chunks(batch_size.max(1))
            .map(<[Arc<ErrorEvent>]>::to_vec)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
