use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Temporal,
    Module,
    Message,
    Context,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Module => "module",
            Self::Message => "message",
            Self::Context => "context",
        }
    }
}

/// `{kind, scope}`. Scope is `<window>s:<module>`, `<module>`, a message hash,
/// or `key=value` depending on the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey {
    pub kind: PatternKind,
    pub scope: String,
}

impl PatternKey {
    pub fn temporal(window_secs: u64, module: &str) -> Self {
        Self {
            kind: PatternKind::Temporal,
            scope: format!("{window_secs}s:{module}"),
        }
    }

    pub fn module(module: &str) -> Self {
        Self {
            kind: PatternKind::Module,
            scope: module.to_string(),
        }
    }

    pub fn message(hash: &str) -> Self {
        Self {
            kind: PatternKind::Message,
            scope: hash.to_string(),
        }
    }

    pub fn context(key: &str, value: &str) -> Self {
        Self {
            kind: PatternKind::Context,
            scope: format!("{key}={value}"),
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.scope)
    }
}

/// Kind-specific aggregates, recomputed on every observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternDetail {
    Temporal {
        window_secs: u64,
        module: String,
        count: usize,
        frequency_per_min: f64,
        recent_event_ids: Vec<String>,
    },
    Module {
        module: String,
        total: usize,
        message_frequency: BTreeMap<String, usize>,
        severity_frequency: BTreeMap<String, usize>,
        most_frequent_message: String,
    },
    Message {
        normalized: String,
        count: usize,
        avg_interval_ms: f64,
        modules: BTreeSet<String>,
    },
    Context {
        key: String,
        value: String,
        count: usize,
        modules: BTreeSet<String>,
        severities: BTreeSet<String>,
    },
}

impl PatternDetail {
    /// Occurrence count carried by the aggregate.
    pub fn count(&self) -> usize {
        match self {
            Self::Temporal { count, .. }
            | Self::Message { count, .. }
            | Self::Context { count, .. } => *count,
            Self::Module { total, .. } => *total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub key: PatternKey,
    /// Number of times this pattern was (re)detected.
    pub occurrences: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub detail: PatternDetail,
}

impl Pattern {
    pub fn new(key: PatternKey, detail: PatternDetail, at: i64) -> Self {
        Self {
            key,
            occurrences: 1,
            first_seen: at,
            last_seen: at,
            detail,
        }
    }
}
