//! Serializable snapshot of everything learned so far.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::ContextPattern;
use crate::periodicity::LearnedPattern;
use crate::recovery::StrategyStats;
use crate::thresholds::AdaptiveThreshold;

/// Learned knowledge, keyed the same way the learning system keys it.
///
/// | Map          | Key                          |
/// |--------------|------------------------------|
/// | `contexts`   | `module:severity:category`   |
/// | `patterns`   | `module:severity`            |
/// | `thresholds` | `module`                     |
/// | `recovery`   | `module:severity` → strategy |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub contexts: BTreeMap<String, ContextPattern>,
    pub patterns: BTreeMap<String, LearnedPattern>,
    pub thresholds: BTreeMap<String, AdaptiveThreshold>,
    pub recovery: BTreeMap<String, BTreeMap<String, StrategyStats>>,
}

impl KnowledgeBase {
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
            && self.patterns.is_empty()
            && self.thresholds.is_empty()
            && self.recovery.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
