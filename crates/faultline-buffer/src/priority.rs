//! Capacity-bounded buffer of error and critical events, most important first.

use std::cmp::Reverse;
use std::sync::Arc;

use faultline_core::ErrorEvent;

#[derive(Debug, Clone)]
pub struct PriorityBuffer {
    entries: Vec<Arc<ErrorEvent>>,
    capacity: usize,
}

fn rank(event: &ErrorEvent) -> (Reverse<u8>, Reverse<i64>) {
    (Reverse(event.severity.weight()), Reverse(event.timestamp))
}

impl PriorityBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Admit an error/critical event. Returns false when it was not retained.
    ///
    /// Entries stay sorted by severity weight descending, then timestamp
    /// descending; the lowest-ranked entry falls off once over capacity.
    pub fn insert(&mut self, event: Arc<ErrorEvent>) -> bool {
        if !event.severity.is_priority() {
            return false;
        }
        let key = rank(&event);
        let pos = self.entries.partition_point(|e| rank(e) <= key);
        if pos >= self.capacity {
            return false;
        }
        self.entries.insert(pos, event);
        self.entries.truncate(self.capacity);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ErrorEvent>> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
