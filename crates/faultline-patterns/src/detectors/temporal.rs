use faultline_core::{time, ErrorEvent};

use crate::history::History;
use crate::pattern::{Pattern, PatternDetail, PatternKey};

/// Event ids kept per temporal pattern.
const RECENT_EVENTS: usize = 5;

/// Same-module bursts inside fixed trailing windows.
pub struct TemporalDetector;

impl TemporalDetector {
    pub fn detect(
        event: &ErrorEvent,
        history: &History,
        windows_secs: &[u64],
        min_occurrences: usize,
    ) -> Vec<Pattern> {
        windows_secs
            .iter()
            .filter_map(|&window_secs| {
                let window_ms = time::secs_to_ms(window_secs);
                let ids: Vec<&str> = history
                    .between(event.timestamp - window_ms, event.timestamp)
                    .filter(|o| o.event.module == event.module)
                    .map(|o| o.event.id.as_str())
                    .collect();
                if ids.len() < min_occurrences {
                    return None;
                }
                let minutes = window_secs as f64 / 60.0;
                let recent = ids[ids.len().saturating_sub(RECENT_EVENTS)..]
                    .iter()
                    .map(|id| id.to_string())
                    .collect();
                Some(Pattern::new(
                    PatternKey::temporal(window_secs, &event.module),
                    PatternDetail::Temporal {
                        window_secs,
                        module: event.module.clone(),
                        count: ids.len(),
                        frequency_per_min: ids.len() as f64 / minutes,
                        recent_event_ids: recent,
                    },
                    event.timestamp,
                ))
            })
            .collect()
    }
}
