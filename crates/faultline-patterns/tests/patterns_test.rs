use std::sync::Arc;

use faultline_core::config::AnalysisConfig;
use faultline_core::{ErrorEvent, Severity};
use faultline_patterns::{
    AnomalyKind, PatternAnalyzer, PatternDetail, PatternKey, PatternKind, TrendDirection,
};
use test_fixtures::{event, secs, EventBuilder};

const BASE: i64 = 1_700_000_000_000;

fn analyzer() -> PatternAnalyzer {
    PatternAnalyzer::new(AnalysisConfig::default())
}

fn feed(a: &mut PatternAnalyzer, events: &[Arc<ErrorEvent>]) {
    for e in events {
        a.process_event(e);
    }
}

// ── Temporal ─────────────────────────────────────────────────────────────

#[test]
fn temporal_frequency_is_count_over_window_minutes() {
    let mut a = analyzer();
    let events: Vec<_> = [0, 10, 20, 30]
        .iter()
        .map(|s| event("database", Severity::Error, BASE + secs(*s)))
        .collect();
    feed(&mut a, &events);

    let one_minute = a.pattern(&PatternKey::temporal(60, "database")).unwrap();
    match &one_minute.detail {
        PatternDetail::Temporal {
            count,
            frequency_per_min,
            recent_event_ids,
            ..
        } => {
            assert_eq!(*count, 4);
            assert!((frequency_per_min - 4.0).abs() < 1e-9);
            assert_eq!(recent_event_ids.len(), 4);
            assert_eq!(recent_event_ids.last(), Some(&events[3].id));
        }
        other => panic!("unexpected detail {other:?}"),
    }
    // Detected at the 3rd and the 4th event.
    assert_eq!(one_minute.occurrences, 2);

    let five_minutes = a.pattern(&PatternKey::temporal(300, "database")).unwrap();
    assert!(matches!(
        five_minutes.detail,
        PatternDetail::Temporal { frequency_per_min, .. } if (frequency_per_min - 0.8).abs() < 1e-9
    ));
}

#[test]
fn below_minimum_occurrences_no_pattern() {
    let mut a = analyzer();
    feed(
        &mut a,
        &[
            event("cache", Severity::Warn, BASE),
            event("cache", Severity::Warn, BASE + secs(5)),
        ],
    );
    assert!(a.patterns().is_empty());
}

#[test]
fn temporal_window_excludes_older_events() {
    let mut a = analyzer();
    feed(
        &mut a,
        &[
            event("api", Severity::Error, BASE),
            event("api", Severity::Error, BASE + secs(100)),
            event("api", Severity::Error, BASE + secs(110)),
        ],
    );
    assert!(a.pattern(&PatternKey::temporal(60, "api")).is_none());
    assert!(a.pattern(&PatternKey::temporal(300, "api")).is_some());
}

// ── Module, message, context ─────────────────────────────────────────────

#[test]
fn module_pattern_tracks_message_and_severity_frequency() {
    let mut a = analyzer();
    let msgs = ["timeout", "timeout", "refused", "timeout"];
    for (i, m) in msgs.iter().enumerate() {
        let severity = if i == 2 { Severity::Critical } else { Severity::Error };
        a.process_event(
            &EventBuilder::new("payments", severity)
                .message(m)
                .at(BASE + secs(i as i64 * 600))
                .arc(),
        );
    }
    let p = a.pattern(&PatternKey::module("payments")).unwrap();
    match &p.detail {
        PatternDetail::Module {
            total,
            message_frequency,
            severity_frequency,
            most_frequent_message,
            ..
        } => {
            assert_eq!(*total, 4);
            assert_eq!(message_frequency["timeout"], 3);
            assert_eq!(severity_frequency["critical"], 1);
            assert_eq!(most_frequent_message, "timeout");
        }
        other => panic!("unexpected detail {other:?}"),
    }
}

#[test]
fn message_pattern_groups_normalized_messages() {
    let mut a = analyzer();
    for (i, (module, msg)) in [
        ("users", "User 17 not found"),
        ("users", "user 923: NOT found."),
        ("billing", "USER 4 not found!"),
    ]
    .iter()
    .enumerate()
    {
        a.process_event(
            &EventBuilder::new(module, Severity::Warn)
                .message(msg)
                .at(BASE + secs(i as i64 * 20))
                .arc(),
        );
    }
    let messages = a.patterns_of(PatternKind::Message);
    assert_eq!(messages.len(), 1);
    match &messages[0].detail {
        PatternDetail::Message {
            normalized,
            count,
            avg_interval_ms,
            modules,
        } => {
            assert_eq!(normalized, "user <N> not found");
            assert_eq!(*count, 3);
            assert!((avg_interval_ms - 20_000.0).abs() < 1e-9);
            assert_eq!(modules.len(), 2);
        }
        other => panic!("unexpected detail {other:?}"),
    }
}

#[test]
fn context_pattern_groups_scalar_metadata() {
    let mut a = analyzer();
    for (i, module) in ["api", "db", "api"].iter().enumerate() {
        a.process_event(
            &EventBuilder::new(module, Severity::Error)
                .meta("region", "us-east")
                .meta("payload", serde_json::json!({"nested": true}))
                .at(BASE + secs(i as i64 * 1_000))
                .arc(),
        );
    }
    let p = a.pattern(&PatternKey::context("region", "us-east")).unwrap();
    match &p.detail {
        PatternDetail::Context {
            count,
            modules,
            severities,
            ..
        } => {
            assert_eq!(*count, 3);
            assert_eq!(modules.len(), 2);
            assert!(severities.contains("error"));
        }
        other => panic!("unexpected detail {other:?}"),
    }
    assert!(a
        .patterns_of(PatternKind::Context)
        .iter()
        .all(|p| !p.key.scope.starts_with("payload")));
}

#[test]
fn pattern_table_is_bounded() {
    let mut a = PatternAnalyzer::new(AnalysisConfig {
        max_patterns: 10,
        temporal_windows_secs: vec![60],
        ..Default::default()
    });
    for m in 0..20 {
        for k in 0..3 {
            a.process_event(&event(&format!("m{m}"), Severity::Error, BASE + secs(m * 100 + k)));
        }
    }
    let stats = a.stats();
    assert!(stats.patterns <= 10);
    assert!(stats.patterns_evicted > 0);
}

// ── Correlations ─────────────────────────────────────────────────────────

#[test]
fn correlations_pair_distinct_signatures_inside_window() {
    let mut a = analyzer();
    feed(
        &mut a,
        &[
            event("db", Severity::Error, BASE),
            event("api", Severity::Error, BASE + secs(60)),
            event("db", Severity::Error, BASE + secs(400)),
        ],
    );
    let all = a.correlations();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].occurrences, 1);
    assert_eq!(all[0].gaps_ms, vec![60_000.0]);
    assert!((all[0].strength - 0.1).abs() < 1e-9);
}

#[test]
fn regular_co_occurrence_builds_strong_correlation() {
    let mut a = analyzer();
    for i in 0..10 {
        let t = BASE + secs(i * 600);
        a.process_event(&event("db", Severity::Error, t));
        a.process_event(&event("api", Severity::Critical, t + secs(10)));
    }
    let strong = a.strong_correlations(0.9);
    assert_eq!(strong.len(), 1);
    assert!(strong[0].involves("db:error"));
    assert!(strong[0].involves("api:critical"));
    assert_eq!(a.stats().strong_correlations, 1);
}

#[test]
fn old_correlations_are_pruned() {
    let mut a = analyzer();
    feed(
        &mut a,
        &[
            event("db", Severity::Error, BASE),
            event("api", Severity::Error, BASE + secs(1)),
        ],
    );
    a.process_event(&event("cache", Severity::Warn, BASE + secs(90_000)));
    assert!(a.correlations().is_empty());
}

// ── Trends ───────────────────────────────────────────────────────────────

#[test]
fn trend_detects_growing_module() {
    let mut a = analyzer();
    let now = BASE + secs(3_600);
    // Segment k (10 minutes each) receives k+1 events.
    for k in 0..6i64 {
        for j in 0..=k {
            a.process_event(&event("search", Severity::Warn, BASE + secs(k * 600 + 60 + j)));
        }
    }
    for k in 0..6i64 {
        a.process_event(&event("steady", Severity::Info, BASE + secs(k * 600 + 300)));
    }

    let report = a.analyze_trends(now).unwrap();
    let search = report.module("search").unwrap();
    assert_eq!(search.counts, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(search.direction, TrendDirection::Increasing);
    assert_eq!(report.module("steady").unwrap().direction, TrendDirection::Stable);
    assert_eq!(
        report.severity("warn").unwrap().direction,
        TrendDirection::Increasing
    );
    assert!(a.last_trends().is_some());
    assert_eq!(a.stats().last_trend_run, Some(now));
}

// ── Anomalies ────────────────────────────────────────────────────────────

fn fill_buckets(a: &mut PatternAnalyzer, counts: &[usize]) -> i64 {
    for (bucket, count) in counts.iter().enumerate() {
        for k in 0..*count {
            // Spread modules so no per-module rule fires.
            let module = format!("svc{k}");
            a.process_event(&event(
                &module,
                Severity::Warn,
                BASE + secs(bucket as i64 * 300 + 10 + k as i64 * 20),
            ));
        }
    }
    BASE + secs(3_600)
}

#[test]
fn spike_of_six_over_quiet_baseline_is_flagged() {
    let mut a = analyzer();
    let now = fill_buckets(&mut a, &[1, 1, 0, 2, 1, 1, 0, 2, 1, 1, 1, 6]);
    let spikes: Vec<_> = a
        .detect_anomalies(now)
        .into_iter()
        .filter(|x| x.kind == AnomalyKind::Spike)
        .collect();
    assert_eq!(spikes.len(), 1);
    assert_eq!(spikes[0].observed, 6.0);
}

#[test]
fn small_bump_is_not_a_spike() {
    let mut a = analyzer();
    let now = fill_buckets(&mut a, &[1, 1, 0, 2, 1, 1, 0, 2, 1, 1, 1, 2]);
    assert!(a
        .detect_anomalies(now)
        .iter()
        .all(|x| x.kind != AnomalyKind::Spike));
}

#[test]
fn noisy_module_is_flagged() {
    let mut a = analyzer();
    let now = BASE + secs(3_600);
    for (i, module) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        for k in 0..2 {
            a.process_event(&event(module, Severity::Info, BASE + secs(i as i64 * 500 + k * 250)));
        }
    }
    for k in 0..20 {
        a.process_event(&event("db", Severity::Error, BASE + secs(k * 170)));
    }
    let modules: Vec<_> = a
        .detect_anomalies(now)
        .into_iter()
        .filter(|x| x.kind == AnomalyKind::Module)
        .collect();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].subject, "db");
}

fn module_anomalies(db_events: i64) -> Vec<String> {
    let mut a = analyzer();
    let now = BASE + secs(3_600);
    for (i, module) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"].iter().enumerate() {
        a.process_event(&event(module, Severity::Info, BASE + secs(10 + i as i64 * 300)));
    }
    for k in 0..db_events {
        a.process_event(&event("db", Severity::Error, BASE + secs(10 + k * 300)));
    }
    a.detect_anomalies(now)
        .into_iter()
        .filter(|x| x.kind == AnomalyKind::Module)
        .map(|x| x.subject)
        .collect()
}

#[test]
fn module_needs_more_than_ten_errors() {
    assert!(module_anomalies(10).is_empty());
    assert_eq!(module_anomalies(11), vec!["db".to_string()]);
}

#[test]
fn runaway_temporal_pattern_is_flagged() {
    let mut a = analyzer();
    for k in 0..12 {
        a.process_event(&event("queue", Severity::Error, BASE + secs(k * 4)));
    }
    let now = BASE + secs(60);
    let found = a.detect_anomalies(now);
    assert!(found
        .iter()
        .any(|x| x.kind == AnomalyKind::Pattern && x.subject == "temporal:60s:queue"));
}

#[test]
fn anomaly_list_is_bounded() {
    let mut a = PatternAnalyzer::new(AnalysisConfig {
        max_anomalies: 2,
        ..Default::default()
    });
    for k in 0..12 {
        a.process_event(&event("queue", Severity::Error, BASE + secs(k * 4)));
    }
    for _ in 0..3 {
        a.detect_anomalies(BASE + secs(60));
    }
    assert_eq!(a.anomalies().len(), 2);
}

mod properties {
    use faultline_patterns::correlation::strength;
    use faultline_patterns::TrendDirection;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn strength_stays_in_unit_interval(
            occurrences in 0u64..1_000,
            gaps in proptest::collection::vec(0.0f64..1e7, 1..50),
        ) {
            let s = strength(occurrences, &gaps);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn monotone_series_are_directional(start in 0usize..100, len in 2usize..12) {
            let up: Vec<usize> = (start..start + len).collect();
            let down: Vec<usize> = up.iter().rev().copied().collect();
            prop_assert_eq!(TrendDirection::classify(&up), TrendDirection::Increasing);
            prop_assert_eq!(TrendDirection::classify(&down), TrendDirection::Decreasing);
        }
    }
}
