//! LearningSystem: owns the four knowledge maps and serves recommendations.

use std::collections::HashMap;

use faultline_core::config::LearningConfig;
use faultline_core::{time, ErrorEvent, ExecutionContext};
use tracing::{debug, info};

use crate::context::ContextGroup;
use crate::features::Features;
use crate::knowledge::KnowledgeBase;
use crate::periodicity::OccurrenceSeries;
use crate::recommendation::Recommendation;
use crate::recovery::RecoveryBook;
use crate::stats::LearningStats;
use crate::thresholds::RateTracker;

/// Learns from classified events and the context they occurred in.
#[derive(Debug)]
pub struct LearningSystem {
    config: LearningConfig,
    contexts: HashMap<String, ContextGroup>,
    series: HashMap<String, OccurrenceSeries>,
    rates: HashMap<String, RateTracker>,
    recovery: HashMap<String, RecoveryBook>,
    events_learned: u64,
    threshold_adjustments: u64,
}

impl LearningSystem {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            contexts: HashMap::new(),
            series: HashMap::new(),
            rates: HashMap::new(),
            recovery: HashMap::new(),
            events_learned: 0,
            threshold_adjustments: 0,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Update context statistics, periodicity, the module threshold and recovery
    /// counters from one event.
    pub fn learn_from_error(&mut self, event: &ErrorEvent, context: &ExecutionContext) {
        let category = event.category().to_string();
        let features = Features::extract(event, context);
        let context_key = ContextGroup::key(&event.module, event.severity, &category);
        let window_ms = time::secs_to_ms(self.config.context_window_secs);

        let learned = self
            .contexts
            .entry(context_key.clone())
            .or_insert_with(|| ContextGroup::new(&event.module, event.severity, &category))
            .observe(
                event.timestamp,
                event.severity,
                features,
                window_ms,
                self.config.min_samples,
            );
        if let Some(pattern) = learned {
            debug!(key = %context_key, confidence = pattern.confidence, "context statistics updated");
        }

        let key = series_key(event);
        self.series.entry(key.clone()).or_default().observe(
            &event.module,
            event.severity,
            event.timestamp,
            time::secs_to_ms(self.config.pattern_window_secs),
            self.config.min_samples,
        );

        let tracker = self
            .rates
            .entry(event.module.clone())
            .or_insert_with(|| RateTracker::new(&event.module));
        if tracker.observe(
            event.timestamp,
            self.config.threshold_change_ratio,
            self.config.learning_rate,
        ) {
            self.threshold_adjustments += 1;
            let t = tracker.threshold();
            debug!(
                module = %event.module,
                rate_per_hour = t.rate_per_hour,
                observed = t.observed_rate,
                "threshold adapted"
            );
        }

        if let Some(attempt) = &context.recovery {
            self.recovery
                .entry(key)
                .or_default()
                .record(&attempt.strategy, attempt.success, event.timestamp);
        }

        self.events_learned += 1;
    }

    /// Recommendations for an event, judged without extra execution context.
    pub fn recommendations(&self, event: &ErrorEvent) -> Vec<Recommendation> {
        self.recommendations_with_context(event, &ExecutionContext::default())
    }

    /// Recommendations above the configured cutoffs: matched context pattern,
    /// best recovery strategy and adapted threshold.
    pub fn recommendations_with_context(
        &self,
        event: &ErrorEvent,
        context: &ExecutionContext,
    ) -> Vec<Recommendation> {
        let mut out = Vec::new();

        let key = ContextGroup::key(&event.module, event.severity, event.category());
        if let Some(pattern) = self.contexts.get(&key).and_then(ContextGroup::learned) {
            if pattern.confidence >= self.config.context_confidence_cutoff {
                let features = Features::extract(event, context);
                let unusual = pattern
                    .numeric
                    .iter()
                    .filter(|(name, stats)| {
                        features
                            .numeric
                            .get(*name)
                            .is_some_and(|v| stats.is_anomalous(*v))
                    })
                    .map(|(name, _)| name.clone())
                    .collect();
                out.push(Recommendation::ContextPattern {
                    key,
                    confidence: pattern.confidence,
                    samples: pattern.samples,
                    dominant: pattern.dominant(),
                    unusual,
                });
            }
        }

        if let Some((strategy, stats)) = self
            .recovery
            .get(&series_key(event))
            .and_then(|book| book.best(self.config.min_recovery_attempts))
        {
            if stats.success_rate() >= self.config.recovery_success_cutoff {
                out.push(Recommendation::Recovery {
                    strategy: strategy.to_string(),
                    success_rate: stats.success_rate(),
                    attempts: stats.attempts,
                });
            }
        }

        if let Some(tracker) = self.rates.get(&event.module) {
            let threshold = tracker.threshold();
            if threshold.confidence >= self.config.threshold_confidence_cutoff {
                let current = tracker.rate_at(event.timestamp);
                out.push(Recommendation::Threshold {
                    module: event.module.clone(),
                    rate_per_hour: threshold.rate_per_hour,
                    current_rate: current,
                    confidence: threshold.confidence,
                    exceeded: threshold.is_exceeded_by(current),
                });
            }
        }

        out
    }

    /// Drop samples that left their windows and groups left with none.
    pub fn cleanup(&mut self, now: i64) {
        let context_cutoff = now - time::secs_to_ms(self.config.context_window_secs);
        let pattern_cutoff = now - time::secs_to_ms(self.config.pattern_window_secs);
        let before = self.contexts.len();

        self.contexts.retain(|_, group| {
            group.prune(context_cutoff);
            !group.is_empty()
        });
        self.series.retain(|_, series| {
            series.prune(pattern_cutoff);
            !series.is_empty()
        });
        for tracker in self.rates.values_mut() {
            tracker.prune(now - time::HOUR_MS);
        }

        let dropped = before - self.contexts.len();
        if dropped > 0 {
            info!(event = "learning_cleanup", dropped_contexts = dropped);
        }
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase {
            contexts: self
                .contexts
                .iter()
                .filter_map(|(k, g)| g.learned().map(|p| (k.clone(), p.clone())))
                .collect(),
            patterns: self
                .series
                .iter()
                .filter_map(|(k, s)| s.learned().map(|p| (k.clone(), p.clone())))
                .collect(),
            thresholds: self
                .rates
                .iter()
                .map(|(k, t)| (k.clone(), t.threshold().clone()))
                .collect(),
            recovery: self
                .recovery
                .iter()
                .map(|(k, b)| (k.clone(), b.strategies().clone()))
                .collect(),
        }
    }

    pub fn stats(&self) -> LearningStats {
        LearningStats {
            events_learned: self.events_learned,
            context_groups: self.contexts.len(),
            context_patterns: self.contexts.values().filter(|g| g.learned().is_some()).count(),
            learned_patterns: self.series.values().filter(|s| s.learned().is_some()).count(),
            thresholds: self.rates.len(),
            threshold_adjustments: self.threshold_adjustments,
            recovery_keys: self.recovery.len(),
            recovery_attempts: self.recovery.values().map(RecoveryBook::attempts).sum(),
        }
    }
}

impl Default for LearningSystem {
    fn default() -> Self {
        Self::new(LearningConfig::default())
    }
}

fn series_key(event: &ErrorEvent) -> String {
    format!("{}:{}", event.module, event.severity)
}
