//! Secondary indexes from derived keys to event ids.
//!
//! Indexes are appended to on insert and never touched on eviction. Readers
//! filter ids that no longer resolve; [`ErrorIndexes::rebuild`] reconciles.

use std::collections::HashMap;

use faultline_core::ErrorEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Module,
    Severity,
    Hour,
    Category,
}

impl IndexKind {
    pub const ALL: [IndexKind; 4] = [Self::Module, Self::Severity, Self::Hour, Self::Category];

    /// The key this index derives from an event.
    pub fn key_of(self, event: &ErrorEvent) -> String {
        match self {
            Self::Module => event.module.clone(),
            Self::Severity => event.severity.as_str().to_string(),
            Self::Hour => event.hour_bucket(),
            Self::Category => event.category().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorIndexes {
    by_module: HashMap<String, Vec<String>>,
    by_severity: HashMap<String, Vec<String>>,
    by_hour: HashMap<String, Vec<String>>,
    by_category: HashMap<String, Vec<String>>,
}

impl ErrorIndexes {
    fn table(&self, kind: IndexKind) -> &HashMap<String, Vec<String>> {
        match kind {
            IndexKind::Module => &self.by_module,
            IndexKind::Severity => &self.by_severity,
            IndexKind::Hour => &self.by_hour,
            IndexKind::Category => &self.by_category,
        }
    }

    fn table_mut(&mut self, kind: IndexKind) -> &mut HashMap<String, Vec<String>> {
        match kind {
            IndexKind::Module => &mut self.by_module,
            IndexKind::Severity => &mut self.by_severity,
            IndexKind::Hour => &mut self.by_hour,
            IndexKind::Category => &mut self.by_category,
        }
    }

    pub fn insert(&mut self, event: &ErrorEvent) {
        for kind in IndexKind::ALL {
            let key = kind.key_of(event);
            self.table_mut(kind)
                .entry(key)
                .or_default()
                .push(event.id.clone());
        }
    }

    /// Ids recorded under `key`, oldest first. May include evicted ids.
    pub fn ids(&self, kind: IndexKind, key: &str) -> &[String] {
        self.table(kind)
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct keys in one index.
    pub fn key_count(&self, kind: IndexKind) -> usize {
        self.table(kind).len()
    }

    /// Replace every index with one derived from `events`.
    pub fn rebuild<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a ErrorEvent>,
    {
        self.clear();
        for event in events {
            self.insert(event);
        }
    }

    pub fn clear(&mut self) {
        for kind in IndexKind::ALL {
            self.table_mut(kind).clear();
        }
    }
}
