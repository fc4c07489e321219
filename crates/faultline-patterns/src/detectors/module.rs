use std::collections::BTreeMap;

use faultline_core::ErrorEvent;

use crate::history::History;
use crate::pattern::{Pattern, PatternDetail, PatternKey};

/// Message and severity distribution of a module with enough history.
pub struct ModuleDetector;

impl ModuleDetector {
    pub fn detect(event: &ErrorEvent, history: &History, min_occurrences: usize) -> Option<Pattern> {
        let mut messages: BTreeMap<String, usize> = BTreeMap::new();
        let mut severities: BTreeMap<String, usize> = BTreeMap::new();
        let mut total = 0usize;
        for o in history.iter().filter(|o| o.event.module == event.module) {
            total += 1;
            *messages.entry(o.event.message.clone()).or_default() += 1;
            *severities
                .entry(o.event.severity.as_str().to_string())
                .or_default() += 1;
        }
        if total < min_occurrences {
            return None;
        }

        // Ties resolve to the lexicographically smallest message.
        let most_frequent_message = messages
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(m, _)| m.clone())
            .unwrap_or_default();

        Some(Pattern::new(
            PatternKey::module(&event.module),
            PatternDetail::Module {
                module: event.module.clone(),
                total,
                message_frequency: messages,
                severity_frequency: severities,
                most_frequent_message,
            },
            event.timestamp,
        ))
    }
}
