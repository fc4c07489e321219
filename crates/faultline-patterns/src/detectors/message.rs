use std::collections::BTreeSet;

use faultline_core::numeric;

use crate::history::{History, Observed};
use crate::pattern::{Pattern, PatternDetail, PatternKey};

/// Groups events whose normalized messages hash alike.
pub struct MessageDetector;

impl MessageDetector {
    pub fn detect(observed: &Observed, history: &History, min_occurrences: usize) -> Option<Pattern> {
        let mut timestamps = Vec::new();
        let mut modules = BTreeSet::new();
        for o in history
            .iter()
            .filter(|o| o.message_hash == observed.message_hash)
        {
            timestamps.push(o.event.timestamp);
            modules.insert(o.event.module.clone());
        }
        if timestamps.len() < min_occurrences {
            return None;
        }
        timestamps.sort_unstable();

        Some(Pattern::new(
            PatternKey::message(&observed.message_hash),
            PatternDetail::Message {
                normalized: observed.normalized.clone(),
                count: timestamps.len(),
                avg_interval_ms: numeric::mean(&numeric::intervals(&timestamps)),
                modules,
            },
            observed.event.timestamp,
        ))
    }
}
