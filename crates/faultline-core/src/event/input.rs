use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Metadata, Severity};
use crate::constants;

/// A raw error submitted by application code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInput {
    pub severity: Severity,
    pub message: String,
    /// Explicit module; falls back to `metadata.module`, then `"unknown"`.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub stack: Option<String>,
    /// Explicit epoch-ms timestamp, used for replay. Defaults to ingestion time.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl ErrorInput {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            module: None,
            metadata: Metadata::new(),
            stack: None,
            timestamp: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn at(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// The module this error is attributed to.
    pub fn resolved_module(&self) -> String {
        self.module
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                self.metadata
                    .get(constants::MODULE_KEY)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| constants::UNKNOWN_MODULE.to_string())
    }
}

/// A classified error ready for the buffer manager, which assigns id and memory snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: Option<i64>,
    pub module: String,
    pub severity: Severity,
    pub message: String,
    pub stack: Option<String>,
    pub metadata: Metadata,
    pub tags: Vec<String>,
}

impl ErrorRecord {
    /// Build a record from a raw input without classification.
    pub fn from_input(input: &ErrorInput) -> Self {
        Self {
            timestamp: input.timestamp,
            module: input.resolved_module(),
            severity: input.severity,
            message: input.message.clone(),
            stack: input.stack.clone(),
            metadata: input.metadata.clone(),
            tags: Vec::new(),
        }
    }
}
