//! Sliding-window duplicate detection.

use std::collections::{HashSet, VecDeque};

use crate::similarity;

#[derive(Debug, Clone)]
struct WindowEntry {
    timestamp: i64,
    hash: String,
    tokens: HashSet<String>,
}

/// Messages seen within the last `window_ms`, compared by hash and token Jaccard.
#[derive(Debug, Clone)]
pub struct DuplicateWindow {
    entries: VecDeque<WindowEntry>,
    window_ms: i64,
    threshold: f64,
}

impl DuplicateWindow {
    pub fn new(window_ms: i64, threshold: f64) -> Self {
        Self {
            entries: VecDeque::new(),
            window_ms,
            threshold,
        }
    }

    /// Returns true if `message` duplicates an entry in the window.
    /// Non-duplicates are recorded. Expired entries are pruned on every call.
    pub fn check(&mut self, message: &str, now_ms: i64) -> bool {
        self.prune(now_ms);

        let hash = similarity::content_hash(&[message]);
        let tokens = similarity::tokenize(message);

        let duplicate = self.entries.iter().any(|entry| {
            entry.hash == hash || similarity::jaccard(&entry.tokens, &tokens) >= self.threshold
        });

        if !duplicate {
            self.entries.push_back(WindowEntry {
                timestamp: now_ms,
                hash,
                tokens,
            });
        }
        duplicate
    }

    fn prune(&mut self, now_ms: i64) {
        let window_ms = self.window_ms;
        self.entries.retain(|e| now_ms - e.timestamp <= window_ms);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
