//! Bounded classification cache keyed by content hash.

use std::collections::{HashMap, VecDeque};

use faultline_core::constants::EVICTION_FRACTION;
use faultline_core::Severity;
use serde::{Deserialize, Serialize};

/// A cached classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedClassification {
    pub severity: Severity,
    pub category: String,
    pub cached_at: i64,
}

/// Insertion-ordered cache; once over `max_entries` the oldest 20% are evicted.
#[derive(Debug, Clone)]
pub struct ClassificationCache {
    entries: HashMap<String, CachedClassification>,
    order: VecDeque<String>,
    max_entries: usize,
}

impl ClassificationCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, hash: &str) -> Option<&CachedClassification> {
        self.entries.get(hash)
    }

    /// Insert or overwrite. Overwriting keeps the original insertion position.
    pub fn insert(&mut self, hash: String, value: CachedClassification) {
        if self.entries.insert(hash.clone(), value).is_none() {
            self.order.push_back(hash);
        }
        if self.entries.len() > self.max_entries {
            self.evict();
        }
    }

    fn evict(&mut self) {
        let count = ((self.entries.len() as f64 * EVICTION_FRACTION).ceil() as usize).max(1);
        for _ in 0..count {
            match self.order.pop_front() {
                Some(hash) => {
                    self.entries.remove(&hash);
                }
                None => break,
            }
        }
        tracing::debug!(evicted = count, remaining = self.entries.len(), "classification cache evicted");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
