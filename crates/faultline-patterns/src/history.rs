//! Bounded event history the detectors scan.

use std::collections::VecDeque;
use std::sync::Arc;

use faultline_core::ErrorEvent;

/// An event plus its precomputed normalized message.
#[derive(Debug, Clone)]
pub struct Observed {
    pub event: Arc<ErrorEvent>,
    pub normalized: String,
    pub message_hash: String,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Observed>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, observed: Observed) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observed);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Observed> + '_ {
        self.entries.iter()
    }

    /// Entries with `from <= timestamp <= to`.
    pub fn between(&self, from: i64, to: i64) -> impl Iterator<Item = &Observed> + '_ {
        self.entries
            .iter()
            .filter(move |o| o.event.timestamp >= from && o.event.timestamp <= to)
    }

    /// Drop entries older than `cutoff`.
    pub fn prune_before(&mut self, cutoff: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|o| o.event.timestamp >= cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
