//! Feature extraction from an execution context plus event metadata.

use std::collections::BTreeMap;

use faultline_core::constants::{CATEGORY_KEY, DUPLICATE_KEY, MODULE_KEY};
use faultline_core::{time, ErrorEvent, ExecutionContext, Metadata};
use serde_json::Value;

/// Numeric and categorical features of one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    pub numeric: BTreeMap<String, f64>,
    pub categorical: BTreeMap<String, String>,
}

impl Features {
    pub fn extract(event: &ErrorEvent, context: &ExecutionContext) -> Self {
        let mut features = Self::default();
        if let Some(load) = context.system_load {
            features.numeric.insert("system_load".into(), load);
        }
        if let Some(memory) = context.memory_usage {
            features.numeric.insert("memory_usage".into(), memory);
        }
        if let Some(connections) = context.active_connections {
            features
                .numeric
                .insert("active_connections".into(), connections as f64);
        }
        let hour = context
            .hour_of_day
            .unwrap_or_else(|| time::hour_of_day(event.timestamp));
        features
            .categorical
            .insert("hour_of_day".into(), hour.to_string());

        features.absorb(&context.attributes);
        features.absorb(&event.metadata);
        features
    }

    /// Scalar metadata: numbers become numeric features, strings and bools categorical.
    fn absorb(&mut self, metadata: &Metadata) {
        for (key, value) in metadata {
            if matches!(key.as_str(), CATEGORY_KEY | MODULE_KEY | DUPLICATE_KEY) {
                continue;
            }
            match value {
                Value::Number(n) => {
                    if let Some(v) = n.as_f64() {
                        self.numeric.insert(key.clone(), v);
                    }
                }
                Value::String(s) => {
                    self.categorical.insert(key.clone(), s.clone());
                }
                Value::Bool(b) => {
                    self.categorical.insert(key.clone(), b.to_string());
                }
                _ => {}
            }
        }
    }
}
