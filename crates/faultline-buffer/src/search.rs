//! Search criteria over the in-memory buffers.

use std::cmp::Ordering;
use std::sync::Arc;

use faultline_core::{ErrorEvent, Severity};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Timestamp,
    Severity,
    Module,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// AND-combined filters plus buffer selection, sort and pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub module: Option<String>,
    pub severity: Option<Severity>,
    /// Inclusive lower bound, epoch ms.
    pub start_time: Option<i64>,
    /// Inclusive upper bound, epoch ms.
    pub end_time: Option<i64>,
    /// Case-insensitive substring of the message.
    pub message: Option<String>,
    pub category: Option<String>,
    /// Search the priority buffer.
    pub priority: bool,
    /// Search the recent buffer. Ignored when `priority` is set.
    pub recent: bool,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    /// Defaults to 100.
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn between(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.start_time = Some(start_ms);
        self.end_time = Some(end_ms);
        self
    }

    pub fn message(mut self, needle: impl Into<String>) -> Self {
        self.message = Some(needle.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn in_priority(mut self) -> Self {
        self.priority = true;
        self
    }

    pub fn in_recent(mut self) -> Self {
        self.recent = true;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = order;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, event: &ErrorEvent) -> bool {
        if self.module.as_deref().is_some_and(|m| m != event.module) {
            return false;
        }
        if self.severity.is_some_and(|s| s != event.severity) {
            return false;
        }
        if self.start_time.is_some_and(|t| event.timestamp < t) {
            return false;
        }
        if self.end_time.is_some_and(|t| event.timestamp > t) {
            return false;
        }
        if let Some(needle) = &self.message {
            if !event
                .message
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self.category.as_deref().is_some_and(|c| c != event.category()) {
            return false;
        }
        true
    }

    /// Filter, sort and paginate `events` (given in buffer order).
    pub fn apply<'a, I>(&self, events: I) -> Vec<Arc<ErrorEvent>>
    where
        I: IntoIterator<Item = &'a Arc<ErrorEvent>>,
    {
        let mut hits: Vec<Arc<ErrorEvent>> = events
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();

        if let Some(field) = self.sort_by {
            hits.sort_by(|a, b| {
                let ord = compare(field, a, b);
                match self.sort_order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        hits.into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .collect()
    }
}

fn compare(field: SortField, a: &ErrorEvent, b: &ErrorEvent) -> Ordering {
    match field {
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::Severity => a
            .severity
            .cmp(&b.severity)
            .then(a.timestamp.cmp(&b.timestamp)),
        SortField::Module => a.module.cmp(&b.module).then(a.timestamp.cmp(&b.timestamp)),
    }
}
