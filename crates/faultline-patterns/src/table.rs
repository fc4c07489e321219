//! Capacity-bounded pattern table.

use std::collections::HashMap;

use faultline_core::constants::EVICTION_FRACTION;

use crate::pattern::{Pattern, PatternKey, PatternKind};

#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: HashMap<PatternKey, Pattern>,
    max_entries: usize,
    evicted: u64,
}

impl PatternTable {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            evicted: 0,
        }
    }

    /// Insert a fresh observation or fold it into the existing entry.
    pub fn upsert(&mut self, observed: Pattern) {
        match self.entries.get_mut(&observed.key) {
            Some(existing) => {
                existing.occurrences += 1;
                existing.last_seen = existing.last_seen.max(observed.last_seen);
                existing.detail = observed.detail;
            }
            None => {
                self.entries.insert(observed.key.clone(), observed);
                if self.entries.len() > self.max_entries {
                    self.evict_oldest();
                }
            }
        }
    }

    /// Drop the oldest 20% by last occurrence.
    fn evict_oldest(&mut self) {
        let count = ((self.entries.len() as f64) * EVICTION_FRACTION).ceil() as usize;
        let mut by_age: Vec<(i64, PatternKey)> = self
            .entries
            .values()
            .map(|p| (p.last_seen, p.key.clone()))
            .collect();
        by_age.sort();
        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
        self.evicted += count as u64;
    }

    pub fn get(&self, key: &PatternKey) -> Option<&Pattern> {
        self.entries.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.entries.values()
    }

    pub fn of_kind(&self, kind: PatternKind) -> impl Iterator<Item = &Pattern> + '_ {
        self.entries.values().filter(move |p| p.key.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternDetail;

    fn module_pattern(name: &str, at: i64) -> Pattern {
        Pattern::new(
            PatternKey::module(name),
            PatternDetail::Module {
                module: name.to_string(),
                total: 3,
                message_frequency: Default::default(),
                severity_frequency: Default::default(),
                most_frequent_message: String::new(),
            },
            at,
        )
    }

    #[test]
    fn overflow_evicts_least_recently_seen() {
        let mut table = PatternTable::new(5);
        for i in 0..6 {
            table.upsert(module_pattern(&format!("m{i}"), i));
        }
        // 6 > 5: ceil(6 * 0.2) = 2 evicted.
        assert_eq!(table.len(), 4);
        assert!(table.get(&PatternKey::module("m0")).is_none());
        assert!(table.get(&PatternKey::module("m1")).is_none());
        assert_eq!(table.evicted(), 2);
    }

    #[test]
    fn upsert_counts_reobservations() {
        let mut table = PatternTable::new(5);
        table.upsert(module_pattern("db", 1));
        table.upsert(module_pattern("db", 9));
        let p = table.get(&PatternKey::module("db")).unwrap();
        assert_eq!(p.occurrences, 2);
        assert_eq!((p.first_seen, p.last_seen), (1, 9));
    }
}
