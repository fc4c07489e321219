use serde::{Deserialize, Serialize};

use super::Metadata;

/// Outcome of a recovery attempt reported alongside an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryAttempt {
    pub strategy: String,
    pub success: bool,
}

/// Execution context captured when an error is learned from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// One-minute load average.
    #[serde(default)]
    pub system_load: Option<f64>,
    /// Fraction of system memory in use (0.0–1.0).
    #[serde(default)]
    pub memory_usage: Option<f64>,
    #[serde(default)]
    pub active_connections: Option<u64>,
    /// Hour of day (0–23, UTC).
    #[serde(default)]
    pub hour_of_day: Option<u32>,
    /// Additional caller-supplied features.
    #[serde(default)]
    pub attributes: Metadata,
    #[serde(default)]
    pub recovery: Option<RecoveryAttempt>,
}

impl ExecutionContext {
    pub fn with_recovery(mut self, strategy: impl Into<String>, success: bool) -> Self {
        self.recovery = Some(RecoveryAttempt {
            strategy: strategy.into(),
            success,
        });
        self
    }

    /// Layer this context over `base`: fields set here win, unset fields come from
    /// `base`, and attributes are merged with this context's values taking precedence.
    pub fn merged_over(self, base: ExecutionContext) -> Self {
        let mut attributes = base.attributes;
        attributes.extend(self.attributes);
        Self {
            system_load: self.system_load.or(base.system_load),
            memory_usage: self.memory_usage.or(base.memory_usage),
            active_connections: self.active_connections.or(base.active_connections),
            hour_of_day: self.hour_of_day.or(base.hour_of_day),
            attributes,
            recovery: self.recovery.or(base.recovery),
        }
    }
}
