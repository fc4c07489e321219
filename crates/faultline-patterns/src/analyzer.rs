//! PatternAnalyzer: owns the event history, pattern table, correlations and anomalies.

use std::collections::VecDeque;
use std::sync::Arc;

use faultline_core::config::AnalysisConfig;
use faultline_core::errors::AnalysisError;
use faultline_core::{time, ErrorEvent};
use tracing::{debug, info, warn};

use crate::anomaly::{self, Anomaly};
use crate::correlation::{Correlation, CorrelationTracker};
use crate::detectors::{ContextDetector, MessageDetector, ModuleDetector, TemporalDetector};
use crate::history::{History, Observed};
use crate::normalize;
use crate::pattern::{Pattern, PatternKey, PatternKind};
use crate::stats::AnalysisStats;
use crate::table::PatternTable;
use crate::trends::{self, TrendReport};

/// Strength at or above which a correlation counts as strong in stats.
pub const STRONG_CORRELATION: f64 = 0.7;

/// What one `process_event` call touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutcome {
    pub patterns: Vec<PatternKey>,
    pub correlations: usize,
}

pub struct PatternAnalyzer {
    config: AnalysisConfig,
    history: History,
    patterns: PatternTable,
    correlations: CorrelationTracker,
    anomalies: VecDeque<Anomaly>,
    last_trends: Option<TrendReport>,
    stats: AnalysisStats,
}

impl PatternAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            history: History::new(config.history_capacity),
            patterns: PatternTable::new(config.max_patterns),
            correlations: CorrelationTracker::default(),
            anomalies: VecDeque::new(),
            last_trends: None,
            stats: AnalysisStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Record an event and run pattern detection and correlation. Each analysis
    /// fails independently; failures are logged and counted.
    pub fn process_event(&mut self, event: &Arc<ErrorEvent>) -> ProcessOutcome {
        self.stats.events_processed += 1;
        let mut outcome = ProcessOutcome::default();

        match self.detect_patterns(event) {
            Ok(keys) => outcome.patterns = keys,
            Err(e) => {
                self.stats.analysis_failures += 1;
                warn!(error = %e, id = %event.id, "pattern detection failed");
            }
        }
        outcome.correlations = self.check_correlations(event);
        outcome
    }

    /// Add the event to the history and upsert every pattern it completes.
    pub fn detect_patterns(
        &mut self,
        event: &Arc<ErrorEvent>,
    ) -> Result<Vec<PatternKey>, AnalysisError> {
        let normalized = normalize::normalize(&event.message)?;
        let observed = Observed {
            event: Arc::clone(event),
            message_hash: normalize::message_hash(&normalized),
            normalized,
        };
        self.history.push(observed.clone());

        let min = self.config.min_occurrences;
        let mut found: Vec<Pattern> =
            TemporalDetector::detect(event, &self.history, &self.config.temporal_windows_secs, min);
        found.extend(ModuleDetector::detect(event, &self.history, min));
        found.extend(MessageDetector::detect(&observed, &self.history, min));
        found.extend(ContextDetector::detect(event, &self.history, min));

        let keys: Vec<PatternKey> = found.iter().map(|p| p.key.clone()).collect();
        for pattern in found {
            self.patterns.upsert(pattern);
        }
        if !keys.is_empty() {
            debug!(id = %event.id, patterns = keys.len(), "patterns updated");
        }
        Ok(keys)
    }

    /// Pair the event with every retained event of a different signature inside the
    /// correlation window. Returns the number of pairs recorded.
    pub fn check_correlations(&mut self, event: &ErrorEvent) -> usize {
        let now = event.timestamp;
        self.correlations
            .prune_before(now - time::secs_to_ms(self.config.correlation_max_age_secs));

        let window = time::secs_to_ms(self.config.correlation_window_secs);
        let signature = event.signature();
        let partners: Vec<(String, i64)> = self
            .history
            .between(now - window, now + window)
            .filter(|o| o.event.id != event.id)
            .map(|o| (o.event.signature(), o.event.timestamp))
            .filter(|(sig, _)| *sig != signature)
            .collect();

        for (other, ts) in &partners {
            self.correlations.observe(&signature, other, now - ts, now);
        }
        partners.len()
    }

    /// Periodic trend analysis over the trailing window ending at `now`.
    pub fn analyze_trends(&mut self, now: i64) -> Result<TrendReport, AnalysisError> {
        let report = trends::analyze(
            &self.history,
            now,
            time::secs_to_ms(self.config.trend_window_secs),
            self.config.trend_segments,
        )?;
        self.stats.last_trend_run = Some(now);
        self.last_trends = Some(report.clone());
        Ok(report)
    }

    /// Periodic anomaly detection. Returns the anomalies found in this run and
    /// appends them to the bounded anomaly list.
    pub fn detect_anomalies(&mut self, now: i64) -> Vec<Anomaly> {
        let mut found = anomaly::spikes(&self.history, now);
        found.extend(anomaly::anomalous_patterns(&self.patterns, now));
        found.extend(anomaly::anomalous_modules(&self.history, now));

        for a in &found {
            info!(event = "anomaly", kind = ?a.kind, subject = %a.subject, observed = a.observed, "anomaly detected");
            self.anomalies.push_back(a.clone());
        }
        while self.anomalies.len() > self.config.max_anomalies {
            self.anomalies.pop_front();
        }
        self.stats.last_anomaly_run = Some(now);
        found
    }

    /// Drop history and correlations older than the retention age.
    pub fn cleanup(&mut self, now: i64) {
        let cutoff = now - time::secs_to_ms(self.config.correlation_max_age_secs);
        let history = self.history.prune_before(cutoff);
        let correlations = self.correlations.prune_before(cutoff);
        if history + correlations > 0 {
            debug!(history, correlations, "pruned analysis state");
        }
    }

    pub fn patterns(&self) -> Vec<&Pattern> {
        let mut all: Vec<&Pattern> = self.patterns.values().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    pub fn patterns_of(&self, kind: PatternKind) -> Vec<&Pattern> {
        self.patterns.of_kind(kind).collect()
    }

    pub fn pattern(&self, key: &PatternKey) -> Option<&Pattern> {
        self.patterns.get(key)
    }

    pub fn correlations(&self) -> Vec<&Correlation> {
        self.correlations.iter().collect()
    }

    pub fn strong_correlations(&self, min_strength: f64) -> Vec<Correlation> {
        self.correlations.strong(min_strength)
    }

    pub fn last_trends(&self) -> Option<&TrendReport> {
        self.last_trends.as_ref()
    }

    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.iter().cloned().collect()
    }

    pub fn stats(&self) -> AnalysisStats {
        let mut by_kind = std::collections::BTreeMap::new();
        for p in self.patterns.values() {
            *by_kind.entry(p.key.kind.as_str().to_string()).or_default() += 1;
        }
        AnalysisStats {
            history_size: self.history.len(),
            patterns: self.patterns.len(),
            patterns_by_kind: by_kind,
            patterns_evicted: self.patterns.evicted(),
            correlations: self.correlations.len(),
            strong_correlations: self.correlations.strong(STRONG_CORRELATION).len(),
            anomalies: self.anomalies.len(),
            ..self.stats.clone()
        }
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
