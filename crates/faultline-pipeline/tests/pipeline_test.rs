use std::sync::{Arc, Mutex};
use std::time::Duration;

use faultline_core::errors::{ClassificationError, FaultlineError, FaultlineResult};
use faultline_core::traits::{IBatchSink, IContextSupplier};
use faultline_core::{ErrorEvent, ErrorInput, ExecutionContext, FaultlineConfig, Severity};
use faultline_learning::Recommendation;
use faultline_pipeline::{tracing_setup, ErrorPipeline, Job, PipelineEvent};
use faultline_prediction::{MemoryAlertChannel, PredictionKind, PredictionStatus};
use test_fixtures::{load_scenario, secs};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const BASE: i64 = 1_700_000_000_000;

/// Returns the same context for every event.
struct FixedContext(ExecutionContext);

impl IContextSupplier for FixedContext {
    fn capture(&self) -> ExecutionContext {
        self.0.clone()
    }
}

#[derive(Default)]
struct CollectingSink {
    batches: Mutex<Vec<usize>>,
}

impl IBatchSink for CollectingSink {
    fn process_batch(&self, batch: &[Arc<ErrorEvent>]) -> FaultlineResult<()> {
        self.batches.lock().unwrap().push(batch.len());
        Ok(())
    }
}

fn pipeline() -> ErrorPipeline {
    ErrorPipeline::new(FaultlineConfig::default()).with_context_supplier(Arc::new(FixedContext(
        ExecutionContext {
            system_load: Some(0.5),
            ..Default::default()
        },
    )))
}

fn input(module: &str, severity: Severity, message: &str, at_secs: i64) -> ErrorInput {
    ErrorInput::new(severity, message)
        .with_module(module)
        .at(BASE + secs(at_secs))
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return out,
        }
    }
}

// ── End to end ───────────────────────────────────────────────────────────

#[test]
fn database_outage_prediction_is_fulfilled_end_to_end() {
    let p = pipeline();
    let inputs = load_scenario("database_outage").inputs(BASE);

    for input in &inputs[..3] {
        assert!(p.add_error(input.clone()));
    }
    let active = p.active_predictions();
    let temporal = active
        .iter()
        .find(|p| p.kind == PredictionKind::Temporal && p.module == "database")
        .expect("temporal prediction");
    assert_eq!(temporal.expected_at, BASE + secs(90));
    assert!(temporal.confidence > 0.0);

    let report = p.submit(inputs[3].clone()).unwrap();
    assert_eq!(report.event.severity, Severity::Critical);
    assert_eq!(report.event.category(), "database");
    let fulfilled: Vec<_> = report
        .resolved
        .iter()
        .filter(|r| r.status == PredictionStatus::Fulfilled)
        .collect();
    assert_eq!(fulfilled.len(), 1);
    assert_eq!(fulfilled[0].id, temporal.id);

    assert_eq!(p.prediction_stats().fulfilled, 1);
    assert_eq!(p.stats().counters.total_errors, 4);
    assert_eq!(p.critical_errors(10).len(), 4);
    assert_eq!(p.learning_stats().events_learned, 4);
    assert_eq!(p.analysis_stats().events_processed, 4);
}

#[test]
fn classification_flows_into_the_buffer() {
    let p = pipeline();
    let report = p
        .submit(input("api", Severity::Info, "fatal: unable to allocate buffer", 0))
        .unwrap();
    assert!(report.classification.escalated);
    assert_eq!(report.event.severity, Severity::Critical);
    assert!(report.event.has_tag("escalated"));
    assert_eq!(p.errors_by_module("api", 10).len(), 1);
    assert_eq!(p.classification_stats().escalated, 1);
}

#[test]
fn invalid_input_is_rejected_without_stopping_the_pipeline() {
    let p = pipeline();
    assert!(!p.add_error(input("api", Severity::Error, "", 0)));
    assert!(p.add_error(input("api", Severity::Error, "request failed", 1)));
    let stats = p.stats();
    assert_eq!(stats.counters.failed_ingestions, 1);
    assert_eq!(stats.counters.total_errors, 1);
}

#[test]
fn duplicates_are_dropped_when_suppression_is_on() {
    let mut config = FaultlineConfig::default();
    config.classification.suppress_duplicates = true;
    let p = ErrorPipeline::new(config);
    let mut rx = p.subscribe();

    assert!(p.add_error(input("api", Severity::Error, "disk full on /var", 0)));
    let err = p
        .submit(input("api", Severity::Error, "disk full on /var", 5))
        .unwrap_err();
    assert!(matches!(
        err,
        FaultlineError::Classification(ClassificationError::DuplicateSuppressed { .. })
    ));

    let stats = p.stats();
    assert_eq!(stats.counters.total_errors, 1);
    assert_eq!(stats.counters.failed_ingestions, 0);
    assert_eq!(p.classification_stats().duplicates, 1);
    assert_eq!(p.learning_stats().events_learned, 1);
    let names: Vec<_> = drain(&mut rx).iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["ingested", "suppressed"]);
}

#[test]
fn duplicates_are_buffered_by_default() {
    let p = pipeline();
    assert!(p.add_error(input("api", Severity::Error, "disk full on /var", 0)));
    assert!(p.add_error(input("api", Severity::Error, "disk full on /var", 5)));
    assert_eq!(p.stats().counters.total_errors, 2);
}

// ── Notifications ────────────────────────────────────────────────────────

#[test]
fn subscribers_see_ingestion_and_duplicates() {
    let p = pipeline();
    let mut rx = p.subscribe();
    p.add_error(input("api", Severity::Error, "disk full on /var", 0));
    p.add_error(input("api", Severity::Error, "disk full on /var", 5));

    let names: Vec<_> = drain(&mut rx).iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["ingested", "ingested", "duplicate"]);
}

#[test]
fn confident_prediction_raises_alert() {
    let channel = Arc::new(MemoryAlertChannel::new());
    let p = pipeline().with_alert_channel(channel.clone());
    let mut rx = p.subscribe();

    for i in 0..8 {
        p.add_error(input("api", Severity::Error, "api request failed", i * 10));
    }
    assert_eq!(channel.len(), 1);
    let alert = &channel.alerts()[0];
    assert_eq!(alert.module, "api");
    assert!(alert.confidence >= 0.8);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::AlertRaised { alert } if alert.module == "api")));
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::PredictionResolved { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::PredictionCreated { .. })));
}

#[test]
fn expiry_sweep_announces_resolution() {
    let p = pipeline();
    for s in [0, 30, 60] {
        p.add_error(input("database", Severity::Critical, "database connection lost", s));
    }
    let mut rx = p.subscribe();
    let expired = p.expire_predictions(BASE + secs(90 + 601));
    assert_eq!(expired.len(), 1);
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [PipelineEvent::PredictionResolved { prediction }] if prediction.status == PredictionStatus::Expired
    ));
}

// ── Learning ─────────────────────────────────────────────────────────────

#[test]
fn recovery_outcomes_become_recommendations() {
    let context = ExecutionContext::default().with_recovery("failover", true);
    let p = ErrorPipeline::new(FaultlineConfig::default())
        .with_context_supplier(Arc::new(FixedContext(context)));
    let mut last = None;
    for i in 0..3 {
        last = Some(
            p.submit(input("db", Severity::Error, "query failed", i * 60))
                .unwrap()
                .event,
        );
    }
    let recs = p.recommendations(&last.unwrap());
    assert!(recs.iter().any(|r| matches!(
        r,
        Recommendation::Recovery { strategy, attempts: 3, .. } if strategy == "failover"
    )));
    assert_eq!(p.knowledge_base().recovery["db:error"]["failover"].successes, 3);
}

#[test]
fn recovery_outcome_travels_with_its_event() {
    let p = pipeline();
    let failover = ExecutionContext::default().with_recovery("failover", true);

    let mut last = None;
    for i in 0..4 {
        let raw = input("db", Severity::Error, "query failed", i * 60);
        let report = if i == 2 {
            p.submit(raw).unwrap()
        } else {
            p.submit_with_context(raw, failover.clone()).unwrap()
        };
        last = Some(report.event);
    }
    p.submit_with_context(
        input("db", Severity::Error, "query failed", 300),
        ExecutionContext::default().with_recovery("restart", false),
    )
    .unwrap();

    let kb = p.knowledge_base();
    let book = &kb.recovery["db:error"];
    assert_eq!(book["failover"].attempts, 3);
    assert_eq!(book["failover"].successes, 3);
    assert_eq!(book["restart"].attempts, 1);
    assert_eq!(p.learning_stats().recovery_attempts, 4);

    let recs = p.recommendations(&last.unwrap());
    let strategies: Vec<_> = recs
        .iter()
        .filter_map(|r| match r {
            Recommendation::Recovery { strategy, .. } => Some(strategy.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(strategies, vec!["failover"]);
}

#[test]
fn learned_hour_comes_from_event_time() {
    // BASE is 22:13 UTC; the default supplier must not substitute the wall clock.
    let p = ErrorPipeline::new(FaultlineConfig::default());
    for i in 0..5 {
        p.add_error(input("api", Severity::Error, &format!("request {i} failed"), i * 60));
    }
    let kb = p.knowledge_base();
    let pattern = &kb.contexts["api:error:general"];
    assert_eq!(pattern.categorical["hour_of_day"].mode, "22");
}

#[test]
fn maintenance_and_analysis_run_on_demand() {
    let p = pipeline();
    for i in 0..5 {
        p.add_error(input("queue", Severity::Warn, "retrying upload", i));
    }
    p.maintenance(BASE + secs(10));
    p.run_analysis(BASE + secs(10));
    let trends = p.last_trends().expect("trend report");
    assert!(trends.module("queue").is_some());
    assert!(!p.patterns().is_empty());
}

// ── Persistence ──────────────────────────────────────────────────────────

#[test]
fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = FaultlineConfig::default();
    config.buffer.log_dir = dir.path().join("logs").display().to_string();
    config.buffer.archive_dir = dir.path().join("logs/archive").display().to_string();
    config.buffer.state_path = dir.path().join("state.json").display().to_string();

    let p = ErrorPipeline::open(config.clone());
    for i in 0..3 {
        assert!(p.add_error(input("api", Severity::Error, &format!("request {i} failed"), i)));
    }
    p.shutdown();
    assert!(dir.path().join("logs/errors.log").exists());

    let reopened = ErrorPipeline::open(config);
    assert_eq!(reopened.stats().counters.total_errors, 3);
    assert_eq!(reopened.errors_by_module("api", 10).len(), 3);
}

// ── Scheduler ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scheduler_flushes_and_stops() {
    let mut config = FaultlineConfig::default();
    config.buffer.temporal_flush_interval_secs = 1;
    config.buffer.persist_interval_secs = 0;

    let sink = Arc::new(CollectingSink::default());
    let p = Arc::new(ErrorPipeline::new(config).with_batch_sink(sink.clone()));
    let handle = p.start();
    assert!(!handle.jobs().contains(&Job::Persist));
    assert!(handle.jobs().contains(&Job::FlushTemporal));

    p.add_error(input("api", Severity::Error, "request failed", 0));
    p.add_error(input("db", Severity::Error, "query failed", 1));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while sink.batches.lock().unwrap().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(*sink.batches.lock().unwrap(), vec![2]);

    tokio::time::timeout(Duration::from_secs(5), p.stop(handle))
        .await
        .expect("scheduler stops promptly");
}

#[tokio::test]
async fn scheduler_runs_analysis_and_expiry_jobs() {
    let mut config = FaultlineConfig::default();
    config.buffer.temporal_flush_interval_secs = 0;
    config.buffer.persist_interval_secs = 0;
    config.buffer.rotation_check_interval_secs = 0;
    config.analysis.analysis_interval_secs = 1;
    config.prediction.expiry_interval_secs = 1;

    let p = Arc::new(ErrorPipeline::new(config));
    for s in [0, 30, 60] {
        p.add_error(input("database", Severity::Critical, "database connection lost", s));
    }
    assert_eq!(p.active_predictions().len(), 1);
    let mut rx = p.subscribe();
    let handle = p.start();

    // Events are in 2023, so the first expiry sweep resolves the prediction.
    let resolved = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(PipelineEvent::PredictionResolved { prediction }) => return prediction,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("channel closed"),
            }
        }
    })
    .await
    .expect("expiry job ran");
    assert_eq!(resolved.status, PredictionStatus::Expired);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while p.analysis_stats().last_trend_run.is_none() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(p.last_trends().is_some());
    p.stop(handle).await;
}

#[test]
fn tracing_init_is_idempotent() {
    let config = FaultlineConfig::default().observability;
    tracing_setup::init(&config);
    assert!(!tracing_setup::init(&config));
}
