use std::collections::VecDeque;
use std::sync::Arc;

use faultline_core::ErrorEvent;

/// Bounded event history the models read from, oldest first.
#[derive(Debug, Clone)]
pub struct EventHistory {
    events: VecDeque<Arc<ErrorEvent>>,
    capacity: usize,
}

impl EventHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(4_096)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: Arc<ErrorEvent>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<ErrorEvent>> {
        self.events.iter()
    }

    /// Events of `module` at or after `since` and not after `until`.
    pub fn module_between<'a>(
        &'a self,
        module: &'a str,
        since: i64,
        until: i64,
    ) -> impl Iterator<Item = &'a Arc<ErrorEvent>> + 'a {
        self.events
            .iter()
            .filter(move |e| e.module == module && e.timestamp >= since && e.timestamp <= until)
    }

    /// All events in `[since, until]`.
    pub fn between(&self, since: i64, until: i64) -> impl Iterator<Item = &Arc<ErrorEvent>> {
        self.events
            .iter()
            .filter(move |e| e.timestamp >= since && e.timestamp <= until)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
