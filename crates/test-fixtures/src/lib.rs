//! Shared builders and scenario fixtures for Faultline integration tests.
//!
//! Events carry deterministic ids (`evt-<n>`) and explicit timestamps so tests never
//! depend on wall-clock time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use faultline_core::constants::CATEGORY_KEY;
use faultline_core::{
    ErrorEvent, ErrorInput, ErrorRecord, MemorySnapshot, Metadata, Severity,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> String {
    format!("evt-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Seconds to epoch milliseconds.
pub fn secs(s: i64) -> i64 {
    s * 1_000
}

/// Fluent builder for [`ErrorEvent`].
#[derive(Debug, Clone)]
pub struct EventBuilder {
    module: String,
    severity: Severity,
    message: String,
    timestamp: i64,
    stack: Option<String>,
    metadata: Metadata,
    tags: Vec<String>,
}

impl EventBuilder {
    pub fn new(module: &str, severity: Severity) -> Self {
        Self {
            module: module.to_string(),
            severity,
            message: format!("{module} failure"),
            timestamp: 0,
            stack: None,
            metadata: Metadata::new(),
            tags: Vec::new(),
        }
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// Epoch milliseconds.
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn at_secs(self, s: i64) -> Self {
        self.at(secs(s))
    }

    pub fn category(self, category: &str) -> Self {
        self.meta(CATEGORY_KEY, category)
    }

    pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn stack(mut self, stack: &str) -> Self {
        self.stack = Some(stack.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn build(self) -> ErrorEvent {
        ErrorEvent {
            id: next_id(),
            timestamp: self.timestamp,
            module: self.module,
            severity: self.severity,
            message: self.message,
            stack: self.stack,
            metadata: self.metadata,
            tags: self.tags,
            memory: MemorySnapshot::default(),
        }
    }

    pub fn arc(self) -> Arc<ErrorEvent> {
        Arc::new(self.build())
    }

    /// The same fields as a buffer record (id and memory are assigned on ingest).
    pub fn record(self) -> ErrorRecord {
        ErrorRecord {
            timestamp: Some(self.timestamp),
            module: self.module,
            severity: self.severity,
            message: self.message,
            stack: self.stack,
            metadata: self.metadata,
            tags: self.tags,
        }
    }

    /// The same fields as a raw submission.
    pub fn input(self) -> ErrorInput {
        ErrorInput {
            severity: self.severity,
            message: self.message,
            module: Some(self.module),
            metadata: self.metadata,
            stack: self.stack,
            timestamp: Some(self.timestamp),
        }
    }
}

/// Shorthand for a single event at `at_ms`.
pub fn event(module: &str, severity: Severity, at_ms: i64) -> Arc<ErrorEvent> {
    EventBuilder::new(module, severity).at(at_ms).arc()
}

/// One event per offset (seconds), same module and severity.
pub fn series(module: &str, severity: Severity, offsets_secs: &[i64]) -> Vec<Arc<ErrorEvent>> {
    offsets_secs
        .iter()
        .map(|s| event(module, severity, secs(*s)))
        .collect()
}

// ── JSON scenarios ───────────────────────────────────────────────────────

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub offset_secs: i64,
    pub module: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A timed sequence of raw errors.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    /// Inputs with timestamps offset from `base_ms`.
    pub fn inputs(&self, base_ms: i64) -> Vec<ErrorInput> {
        self.events
            .iter()
            .map(|e| ErrorInput {
                severity: e.severity,
                message: e.message.clone(),
                module: Some(e.module.clone()),
                metadata: e.metadata.clone(),
                stack: None,
                timestamp: Some(base_ms + secs(e.offset_secs)),
            })
            .collect()
    }
}

/// Load `fixtures/scenarios/<name>.json`.
pub fn load_scenario(name: &str) -> Scenario {
    load_fixture(&format!("scenarios/{name}.json"))
}
