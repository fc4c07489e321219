use std::collections::BTreeSet;

use faultline_core::constants::DUPLICATE_KEY;
use faultline_core::ErrorEvent;
use serde_json::Value;

use crate::history::History;
use crate::pattern::{Pattern, PatternDetail, PatternKey};

/// String form of a scalar metadata value; `None` for null, arrays and objects.
pub fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Events sharing a scalar metadata `key=value` pair.
pub struct ContextDetector;

impl ContextDetector {
    pub fn detect(event: &ErrorEvent, history: &History, min_occurrences: usize) -> Vec<Pattern> {
        event
            .metadata
            .iter()
            .filter(|(key, _)| key.as_str() != DUPLICATE_KEY)
            .filter_map(|(key, value)| {
                let value = scalar(value)?;
                let mut modules = BTreeSet::new();
                let mut severities = BTreeSet::new();
                let mut count = 0usize;
                for o in history.iter().filter(|o| {
                    o.event.metadata.get(key).and_then(scalar).as_deref() == Some(value.as_str())
                }) {
                    count += 1;
                    modules.insert(o.event.module.clone());
                    severities.insert(o.event.severity.as_str().to_string());
                }
                if count < min_occurrences {
                    return None;
                }
                Some(Pattern::new(
                    PatternKey::context(key, &value),
                    PatternDetail::Context {
                        key: key.clone(),
                        value,
                        count,
                        modules,
                        severities,
                    },
                    event.timestamp,
                ))
            })
            .collect()
    }
}
