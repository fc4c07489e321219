use std::sync::Arc;

use faultline_core::config::PredictionConfig;
use faultline_core::errors::PredictionError;
use faultline_core::{AlertSeverity, ErrorEvent, Severity};
use faultline_prediction::models::TemporalModel;
use faultline_prediction::{
    band_for, EventHistory, IPredictionModel, MemoryAlertChannel, PredictionCandidate,
    PredictionEngine, PredictionKind, PredictionStatus, TracingAlertChannel,
};
use proptest::prelude::*;
use test_fixtures::{event, load_scenario, secs, EventBuilder};

const BASE: i64 = 1_700_000_000_000;

fn at(s: i64) -> i64 {
    BASE + secs(s)
}

fn feed(engine: &mut PredictionEngine, events: &[Arc<ErrorEvent>]) {
    for e in events {
        engine.process_event(e);
    }
}

fn temporal_for<'a>(
    engine: &'a PredictionEngine,
    module: &str,
) -> Vec<&'a faultline_prediction::Prediction> {
    engine
        .active_predictions()
        .iter()
        .filter(|p| p.kind == PredictionKind::Temporal && p.module == module)
        .collect()
}

/// Emits one fixed candidate per event.
struct FixedModel {
    confidence: f64,
    delay_ms: i64,
}

impl IPredictionModel for FixedModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Frequency
    }

    fn predict(
        &self,
        trigger: &ErrorEvent,
        _history: &EventHistory,
        _config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        Ok(Some(PredictionCandidate {
            kind: PredictionKind::Frequency,
            module: trigger.module.clone(),
            expected_at: trigger.timestamp + self.delay_ms,
            confidence: self.confidence,
            model: self.name().to_string(),
            expected_severity: None,
            expected_category: None,
        }))
    }
}

struct BrokenModel;

impl IPredictionModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn kind(&self) -> PredictionKind {
        PredictionKind::Sequence
    }

    fn predict(
        &self,
        _trigger: &ErrorEvent,
        _history: &EventHistory,
        _config: &PredictionConfig,
    ) -> Result<Option<PredictionCandidate>, PredictionError> {
        Err(PredictionError::ModelFailed {
            model: "broken".into(),
            reason: "always fails".into(),
        })
    }
}

// ── Temporal model ───────────────────────────────────────────────────────

#[test]
fn temporal_prediction_uses_average_interval() {
    let mut engine = PredictionEngine::default();
    let events: Vec<_> = [0, 10, 20, 30]
        .iter()
        .map(|s| event("database", Severity::Error, at(*s)))
        .collect();
    feed(&mut engine, &events);

    let predictions = temporal_for(&engine, "database");
    // Created at 20s (expected 30s), then reinforced at 30s (expected 40s).
    assert_eq!(predictions.len(), 1);
    let p = predictions[0];
    assert_eq!(p.reinforcements, 1);
    assert_eq!(p.expected_at, (at(30) + at(40)) / 2);
    assert!((p.confidence - 0.35).abs() < 1e-9);
}

#[test]
fn average_interval_of_even_series_is_ten_seconds() {
    let mut history = EventHistory::new(100);
    for s in [0, 10, 20, 30] {
        history.push(event("database", Severity::Error, at(s)));
    }
    let trigger = history.iter().last().unwrap().clone();
    let candidate = TemporalModel
        .predict(&trigger, &history, &PredictionConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(candidate.expected_at - trigger.timestamp, 10_000);
    assert!((candidate.confidence - 0.4).abs() < 1e-9);
    assert_eq!(candidate.expected_severity, Some(Severity::Error));
}

#[test]
fn fewer_than_three_events_predict_nothing() {
    let mut engine = PredictionEngine::default();
    feed(
        &mut engine,
        &[
            event("database", Severity::Error, at(0)),
            event("database", Severity::Error, at(30)),
        ],
    );
    assert!(engine.active_predictions().is_empty());
}

// ── Verification ─────────────────────────────────────────────────────────

#[test]
fn database_outage_prediction_is_fulfilled() {
    let scenario = load_scenario("database_outage");
    let events: Vec<Arc<ErrorEvent>> = scenario
        .events
        .iter()
        .map(|e| {
            EventBuilder::new(&e.module, e.severity)
                .message(&e.message)
                .at(at(e.offset_secs))
                .arc()
        })
        .collect();

    let mut engine = PredictionEngine::default();
    feed(&mut engine, &events[..3]);
    let predicted = temporal_for(&engine, "database");
    assert_eq!(predicted.len(), 1);
    assert_eq!(predicted[0].expected_at, at(90));
    assert!(predicted[0].confidence > 0.0);

    let resolved = engine.verify_predictions(&events[3]);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].status, PredictionStatus::Fulfilled);
    let accuracy = resolved[0].accuracy.unwrap();
    assert!((accuracy - (1.0 - 2_000.0 / 600_000.0)).abs() < 1e-9);

    let stats = engine.stats();
    assert_eq!(stats.fulfilled, 1);
    assert_eq!(stats.accuracy, 1.0);
    assert_eq!(stats.by_model["temporal"].fulfilled, 1);
    assert!(engine.active_predictions().is_empty());
}

#[test]
fn lower_severity_does_not_fulfill() {
    let mut engine = PredictionEngine::default();
    feed(
        &mut engine,
        &[0, 30, 60].map(|s| event("database", Severity::Critical, at(s))),
    );
    let resolved = engine.verify_predictions(&event("database", Severity::Warn, at(90)));
    assert!(resolved.is_empty());
    assert_eq!(engine.active_predictions().len(), 1);
}

#[test]
fn other_category_does_not_fulfill() {
    let mut engine = PredictionEngine::default();
    let db = |s| {
        EventBuilder::new("database", Severity::Error)
            .category("database")
            .at(at(s))
            .arc()
    };
    feed(&mut engine, &[db(0), db(30), db(60)]);
    let network = EventBuilder::new("database", Severity::Error)
        .category("network")
        .at(at(90))
        .build();
    assert!(engine.verify_predictions(&network).is_empty());
    assert_eq!(engine.verify_predictions(&db(91)).len(), 1);
}

#[test]
fn predictions_expire_after_window() {
    let mut engine = PredictionEngine::default();
    feed(
        &mut engine,
        &[0, 30, 60].map(|s| event("database", Severity::Error, at(s))),
    );
    // Unrelated error long after the window closed.
    let resolved = engine.verify_predictions(&event("cache", Severity::Error, at(90 + 601)));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].status, PredictionStatus::Expired);
    assert_eq!(engine.stats().expired, 1);
    assert_eq!(engine.stats().accuracy, 0.0);
}

#[test]
fn expire_stale_sweeps_without_events() {
    let mut engine = PredictionEngine::default();
    feed(
        &mut engine,
        &[0, 30, 60].map(|s| event("database", Severity::Error, at(s))),
    );
    assert!(engine.expire_stale(at(600)).is_empty());
    let expired = engine.expire_stale(at(691));
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].resolved_at, Some(at(691)));
    assert_eq!(engine.history().count(), 1);
}

#[test]
fn resolved_history_is_bounded() {
    let config = PredictionConfig {
        history_capacity: 2,
        ..Default::default()
    };
    let mut engine = PredictionEngine::with_models(
        config,
        vec![Box::new(FixedModel {
            confidence: 0.5,
            delay_ms: 1_000,
        })],
    );
    for (i, module) in ["a", "b", "c"].iter().enumerate() {
        engine.process_event(&event(module, Severity::Error, at(i as i64)));
    }
    engine.expire_stale(at(10_000));
    assert_eq!(engine.stats().expired, 3);
    assert_eq!(engine.history().count(), 2);
}

// ── Frequency and sequence ───────────────────────────────────────────────

#[test]
fn frequency_needs_ten_events_for_confidence() {
    let mut engine = PredictionEngine::default();
    for i in 0..9 {
        engine.process_event(&event("queue", Severity::Warn, at(i * 60)));
    }
    let has_frequency = |e: &PredictionEngine| {
        e.active_predictions()
            .iter()
            .any(|p| p.kind == PredictionKind::Frequency)
    };
    assert!(!has_frequency(&engine));

    let outcome = engine.process_event(&event("queue", Severity::Warn, at(540)));
    let frequency = outcome
        .predictions
        .iter()
        .find(|p| p.kind == PredictionKind::Frequency)
        .expect("frequency prediction");
    // 10 events over a 9-minute span, clamped to one hour: 10/h.
    assert_eq!(frequency.expected_at, at(540 + 360));
    assert!((frequency.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn sequence_predicts_follower_and_alerts_once() {
    let channel = Arc::new(MemoryAlertChannel::new());
    let mut engine = PredictionEngine::default();
    engine.add_channel(channel.clone());

    for s in [0, 1_000, 2_000] {
        engine.process_event(&event("api", Severity::Error, at(s)));
        engine.process_event(&event("db", Severity::Error, at(s + 10)));
    }
    let outcome = engine.process_event(&event("api", Severity::Error, at(3_000)));
    let sequence = outcome
        .predictions
        .iter()
        .find(|p| p.kind == PredictionKind::Sequence)
        .expect("sequence prediction");
    assert_eq!(sequence.module, "db");
    assert_eq!(sequence.expected_at, at(3_300));
    assert!((sequence.confidence - 0.8).abs() < 1e-9);

    assert_eq!(outcome.alerts.len(), 1);
    assert_eq!(outcome.alerts[0].severity, AlertSeverity::Low);
    assert_eq!(outcome.alerts[0].module, "db");
    assert_eq!(outcome.alerts[0].time_to_error, "in 5 minutes");

    let again = engine.process_event(&event("api", Severity::Error, at(3_001)));
    assert!(again.alerts.is_empty());
    assert_eq!(channel.len(), 1);
    assert_eq!(engine.stats().alerts_raised, 1);
}

// ── Cascade ──────────────────────────────────────────────────────────────

#[test]
fn cascade_predicts_historically_related_module() {
    let mut engine = PredictionEngine::default();
    for s in [-4_000, -2_000] {
        engine.process_event(&event("database", Severity::Error, at(s)));
        engine.process_event(&event("payments", Severity::Error, at(s + 10)));
    }

    let scenario = load_scenario("cascade");
    let mut cascade = Vec::new();
    for e in &scenario.events {
        let evt = EventBuilder::new(&e.module, e.severity)
            .message(&e.message)
            .at(at(e.offset_secs))
            .arc();
        cascade.extend(
            engine
                .process_event(&evt)
                .predictions
                .into_iter()
                .filter(|p| p.kind == PredictionKind::Cascade),
        );
    }

    // Four modules are not enough; the fifth (auth at 20s) tips the risk over 0.6.
    let first = &cascade[0];
    assert_eq!(first.module, "payments");
    assert_eq!(first.created_at, at(20));
    assert_eq!(first.expected_at, at(20 + 120));
    assert!((first.confidence - (0.3 * 0.1 + 0.7)).abs() < 1e-9);

    let active: Vec<_> = engine
        .active_predictions()
        .iter()
        .filter(|p| p.kind == PredictionKind::Cascade)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].reinforcements, 1);
}

// ── Validation, failures, alerts ─────────────────────────────────────────

#[test]
fn low_confidence_candidates_are_rejected() {
    let mut engine = PredictionEngine::with_models(
        PredictionConfig::default(),
        vec![Box::new(FixedModel {
            confidence: 0.1,
            delay_ms: 1_000,
        })],
    );
    let outcome = engine.process_event(&event("api", Severity::Error, at(0)));
    assert!(outcome.predictions.is_empty());
    assert_eq!(engine.stats().rejected, 1);
}

#[test]
fn past_expected_time_is_rejected() {
    let mut engine = PredictionEngine::with_models(
        PredictionConfig::default(),
        vec![Box::new(FixedModel {
            confidence: 0.6,
            delay_ms: 0,
        })],
    );
    engine.process_event(&event("api", Severity::Error, at(0)));
    assert_eq!(engine.stats().rejected, 1);
}

#[test]
fn failing_model_is_skipped() {
    let mut engine = PredictionEngine::with_models(
        PredictionConfig::default(),
        vec![Box::new(BrokenModel), Box::new(TemporalModel)],
    );
    feed(
        &mut engine,
        &[0, 10, 20].map(|s| event("api", Severity::Error, at(s))),
    );
    let stats = engine.stats();
    assert_eq!(stats.by_model["broken"].failures, 3);
    assert_eq!(stats.by_model["temporal"].generated, 1);
}

#[test]
fn confident_prediction_raises_high_alert() {
    let channel = Arc::new(MemoryAlertChannel::new());
    let mut engine = PredictionEngine::with_models(
        PredictionConfig::default(),
        vec![Box::new(FixedModel {
            confidence: 0.95,
            delay_ms: 120_000,
        })],
    );
    engine.add_channel(channel.clone());
    let outcome = engine.process_event(&event("api", Severity::Error, at(0)));
    assert_eq!(outcome.alerts.len(), 1);
    let alerts = channel.alerts();
    assert_eq!(alerts[0].severity, AlertSeverity::High);
    assert_eq!(alerts[0].prediction_id, outcome.predictions[0].id);
    assert_eq!(alerts[0].time_to_error, "in 2 minutes");
    assert_eq!(engine.stats().precision, 0.0);
}

#[test]
fn every_channel_receives_the_alert() {
    let channel = Arc::new(MemoryAlertChannel::new());
    let mut engine = PredictionEngine::with_models(
        PredictionConfig::default(),
        vec![Box::new(FixedModel {
            confidence: 0.9,
            delay_ms: 60_000,
        })],
    );
    engine.add_channel(Arc::new(TracingAlertChannel));
    engine.add_channel(channel.clone());
    engine.process_event(&event("api", Severity::Error, at(0)));

    assert_eq!(channel.len(), 1);
    let stats = engine.stats();
    assert_eq!(stats.alerts_raised, 1);
    assert_eq!(stats.alert_failures, 0);
}

proptest! {
    #[test]
    fn alert_band_is_monotonic(a in 0.8f64..1.0, b in 0.8f64..1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(band_for(lo) <= band_for(hi));
    }
}
