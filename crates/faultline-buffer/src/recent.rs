//! Age-bounded buffer of the most recent events.

use std::collections::VecDeque;
use std::sync::Arc;

use faultline_core::ErrorEvent;

#[derive(Debug, Clone)]
pub struct RecentBuffer {
    entries: VecDeque<Arc<ErrorEvent>>,
    max_age_ms: i64,
}

impl RecentBuffer {
    pub fn new(max_age_ms: i64) -> Self {
        Self {
            entries: VecDeque::new(),
            max_age_ms,
        }
    }

    /// Insert an event and drop everything older than the window relative to it.
    pub fn insert(&mut self, event: Arc<ErrorEvent>) {
        let now = event.timestamp;
        self.entries.push_back(event);
        self.prune(now);
    }

    /// Drop entries older than `now - max_age`.
    pub fn prune(&mut self, now_ms: i64) -> usize {
        let before = self.entries.len();
        let cutoff = now_ms - self.max_age_ms;
        self.entries.retain(|e| e.timestamp >= cutoff);
        before - self.entries.len()
    }

    /// Restore an entry without pruning.
    pub(crate) fn restore(&mut self, event: Arc<ErrorEvent>) {
        self.entries.push_back(event);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Arc<ErrorEvent>> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
