//! PredictionEngine: runs the models, merges, alerts and verifies.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::traits::IAlertChannel;
use faultline_core::{time, Alert, ErrorEvent};
use tracing::{debug, info, warn};

use crate::alerting;
use crate::history::EventHistory;
use crate::models::{self, IPredictionModel, PredictionCandidate};
use crate::prediction::{Prediction, PredictionStatus};
use crate::stats::PredictionStats;

/// Predictions created or reinforced by one event, plus the alerts they raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionOutcome {
    pub predictions: Vec<Prediction>,
    pub alerts: Vec<Alert>,
}

pub struct PredictionEngine {
    config: PredictionConfig,
    models: Vec<Box<dyn IPredictionModel>>,
    channels: Vec<Arc<dyn IAlertChannel>>,
    history: EventHistory,
    active: Vec<Prediction>,
    resolved: VecDeque<Prediction>,
    /// Predictions that already raised an alert.
    alerted: HashSet<String>,
    stats: PredictionStats,
    timing_accuracy_sum: f64,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        Self::with_models(config, models::default_models())
    }

    pub fn with_models(config: PredictionConfig, models: Vec<Box<dyn IPredictionModel>>) -> Self {
        let history = EventHistory::new(config.event_history_capacity);
        Self {
            config,
            models,
            channels: Vec::new(),
            history,
            active: Vec::new(),
            resolved: VecDeque::new(),
            alerted: HashSet::new(),
            stats: PredictionStats::default(),
            timing_accuracy_sum: 0.0,
        }
    }

    pub fn add_channel(&mut self, channel: Arc<dyn IAlertChannel>) {
        self.channels.push(channel);
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// New or reinforced predictions triggered by `event`.
    pub fn process_error_for_prediction(&mut self, event: &Arc<ErrorEvent>) -> Vec<Prediction> {
        self.process_event(event).predictions
    }

    /// Record `event`, run every model, then validate, merge and alert.
    pub fn process_event(&mut self, event: &Arc<ErrorEvent>) -> PredictionOutcome {
        self.history.push(Arc::clone(event));
        let now = event.timestamp;

        let mut candidates = Vec::new();
        for model in &self.models {
            match model.predict(event, &self.history, &self.config) {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => {
                    self.stats
                        .by_model
                        .entry(model.name().to_string())
                        .or_default()
                        .failures += 1;
                    warn!(model = model.name(), error = %e, "prediction model skipped");
                }
            }
        }

        let mut outcome = PredictionOutcome::default();
        for candidate in candidates {
            if let Err(e) = self.validate(&candidate, now) {
                self.stats.rejected += 1;
                debug!(model = %candidate.model, error = %e, "prediction rejected");
                continue;
            }
            let index = self.merge_or_insert(candidate, &event.id, now);
            if let Some(alert) = self.maybe_alert(index, now) {
                outcome.alerts.push(alert);
            }
            outcome.predictions.push(self.active[index].clone());
        }
        outcome
    }

    fn validate(&self, candidate: &PredictionCandidate, now: i64) -> Result<(), PredictionError> {
        if !candidate.confidence.is_finite() || candidate.confidence < self.config.confidence_floor
        {
            return Err(PredictionError::InvalidPrediction {
                reason: format!(
                    "confidence {:.3} below floor {:.3}",
                    candidate.confidence, self.config.confidence_floor
                ),
            });
        }
        if candidate.expected_at <= now {
            return Err(PredictionError::InvalidPrediction {
                reason: "expected time is not in the future".to_string(),
            });
        }
        Ok(())
    }

    fn merge_or_insert(&mut self, candidate: PredictionCandidate, trigger: &str, now: i64) -> usize {
        let window = time::secs_to_ms(self.config.merge_window_secs);
        if let Some(index) = self.active.iter().position(|p| {
            p.kind == candidate.kind
                && p.module == candidate.module
                && (p.expected_at - candidate.expected_at).abs() <= window
        }) {
            let existing = &mut self.active[index];
            existing.confidence = (existing.confidence + candidate.confidence) / 2.0;
            existing.expected_at = (existing.expected_at + candidate.expected_at) / 2;
            existing.reinforcements += 1;
            self.stats.merged += 1;
            debug!(id = %existing.id, reinforcements = existing.reinforcements, "prediction reinforced");
            return index;
        }

        let prediction = Prediction {
            id: uuid::Uuid::new_v4().to_string(),
            kind: candidate.kind,
            module: candidate.module,
            expected_at: candidate.expected_at,
            confidence: candidate.confidence,
            model: candidate.model,
            status: PredictionStatus::Active,
            accuracy: None,
            reinforcements: 0,
            expected_severity: candidate.expected_severity,
            expected_category: candidate.expected_category,
            created_at: now,
            resolved_at: None,
            trigger_id: trigger.to_string(),
        };
        self.stats.generated += 1;
        self.stats
            .by_model
            .entry(prediction.model.clone())
            .or_default()
            .generated += 1;
        info!(
            event = "prediction_created",
            id = %prediction.id,
            kind = %prediction.kind,
            module = %prediction.module,
            confidence = prediction.confidence,
            expected_at = %time::to_rfc3339(prediction.expected_at),
        );
        self.active.push(prediction);
        self.active.len() - 1
    }

    /// Alert once per prediction, when its confidence reaches the threshold.
    fn maybe_alert(&mut self, index: usize, now: i64) -> Option<Alert> {
        let prediction = &self.active[index];
        if prediction.confidence < self.config.alert_threshold
            || self.alerted.contains(&prediction.id)
        {
            return None;
        }
        let alert = alerting::alert_for(prediction, now);
        self.alerted.insert(prediction.id.clone());
        self.stats.alerts_raised += 1;
        for channel in &self.channels {
            if let Err(e) = channel.deliver(&alert) {
                self.stats.alert_failures += 1;
                warn!(channel = channel.name(), error = %e, "alert delivery failed");
            }
        }
        Some(alert)
    }

    /// Resolve active predictions against an observed error.
    ///
    /// A matching prediction within the verification window of its expected time
    /// is fulfilled; any prediction whose window ended before `actual` expires.
    pub fn verify_predictions(&mut self, actual: &ErrorEvent) -> Vec<Prediction> {
        let window = time::secs_to_ms(self.config.verification_window_secs);
        let at = actual.timestamp;
        let mut resolved = Vec::new();
        let mut still_active = Vec::with_capacity(self.active.len());

        for mut prediction in std::mem::take(&mut self.active) {
            let delta = (at - prediction.expected_at).abs();
            if delta <= window && prediction.matches(actual) {
                prediction.fulfill(at, 1.0 - delta as f64 / window as f64);
                info!(
                    event = "prediction_fulfilled",
                    id = %prediction.id,
                    module = %prediction.module,
                    accuracy = prediction.accuracy.unwrap_or_default(),
                );
                resolved.push(prediction);
            } else if at > prediction.expected_at + window {
                prediction.expire(at);
                resolved.push(prediction);
            } else {
                still_active.push(prediction);
            }
        }
        self.active = still_active;
        self.record_resolved(&resolved);
        resolved
    }

    /// Expire predictions whose verification window ended before `now`.
    pub fn expire_stale(&mut self, now: i64) -> Vec<Prediction> {
        let window = time::secs_to_ms(self.config.verification_window_secs);
        let (mut stale, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|p| now > p.expected_at + window);
        self.active = active;
        for prediction in &mut stale {
            prediction.expire(now);
        }
        if !stale.is_empty() {
            debug!(expired = stale.len(), "stale predictions expired");
        }
        self.record_resolved(&stale);
        stale
    }

    fn record_resolved(&mut self, resolved: &[Prediction]) {
        for prediction in resolved {
            self.alerted.remove(&prediction.id);
            match prediction.status {
                PredictionStatus::Fulfilled => {
                    self.stats.fulfilled += 1;
                    self.timing_accuracy_sum += prediction.accuracy.unwrap_or_default();
                    self.stats
                        .by_model
                        .entry(prediction.model.clone())
                        .or_default()
                        .fulfilled += 1;
                }
                PredictionStatus::Expired => self.stats.expired += 1,
                PredictionStatus::Active => continue,
            }
            if self.resolved.len() >= self.config.history_capacity.max(1) {
                self.resolved.pop_front();
            }
            self.resolved.push_back(prediction.clone());
        }
    }

    pub fn active_predictions(&self) -> &[Prediction] {
        &self.active
    }

    /// Resolved predictions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Prediction> {
        self.resolved.iter()
    }

    pub fn event_history(&self) -> &EventHistory {
        &self.history
    }

    pub fn stats(&self) -> PredictionStats {
        let resolved = self.stats.fulfilled + self.stats.expired;
        PredictionStats {
            active: self.active.len(),
            accuracy: ratio(self.stats.fulfilled, resolved),
            precision: ratio(self.stats.fulfilled, self.stats.generated),
            mean_timing_accuracy: if self.stats.fulfilled == 0 {
                0.0
            } else {
                self.timing_accuracy_sum / self.stats.fulfilled as f64
            },
            ..self.stats.clone()
        }
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(PredictionConfig::default())
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("models", &self.models.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("channels", &self.channels.len())
            .field("active", &self.active.len())
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
