use faultline_core::time::MINUTE_MS;
use faultline_core::{ErrorEvent, ExecutionContext, Severity};
use faultline_learning::context::context_confidence;
use faultline_learning::{LearningSystem, Recommendation};
use proptest::prelude::*;
use test_fixtures::{secs, EventBuilder};

/// 2023-11-14T22:13:20Z
const BASE: i64 = 1_700_000_000_000;

fn db_event(at: i64) -> ErrorEvent {
    EventBuilder::new("db", Severity::Error)
        .category("database")
        .at(at)
        .build()
}

fn load(value: f64) -> ExecutionContext {
    ExecutionContext {
        system_load: Some(value),
        ..Default::default()
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Context learning ─────────────────────────────────────────────────────

#[test]
fn context_statistics_need_min_samples() {
    let mut ls = LearningSystem::default();
    for i in 0..4 {
        ls.learn_from_error(&db_event(BASE + secs(i * 60)), &load(1.0));
    }
    assert!(ls.knowledge_base().contexts.is_empty());
    assert_eq!(ls.stats().context_groups, 1);

    ls.learn_from_error(&db_event(BASE + secs(240)), &load(1.0));
    assert_eq!(ls.stats().context_patterns, 1);
}

#[test]
fn numeric_features_get_mean_spread_and_threshold() {
    let mut ls = LearningSystem::default();
    for (i, l) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
        ls.learn_from_error(&db_event(BASE + secs(i as i64 * 60)), &load(l));
    }
    let kb = ls.knowledge_base();
    let pattern = &kb.contexts["db:error:database"];
    let stats = &pattern.numeric["system_load"];
    assert!(close(stats.mean, 3.0));
    assert!(close(stats.std_dev, 2f64.sqrt()));
    assert_eq!((stats.min, stats.max), (1.0, 5.0));
    assert!(close(stats.anomaly_threshold, 3.0 + 2.0 * 2f64.sqrt()));

    // 0.4·(5/20) + 0.3·(240s/3600s) + 0.3·(1 − 1/5)
    assert!(close(pattern.confidence, 0.1 + 0.02 + 0.24));
}

#[test]
fn categorical_features_from_metadata_and_hour() {
    let mut ls = LearningSystem::default();
    for i in 0..6 {
        let region = if i < 4 { "eu" } else { "us" };
        let e = EventBuilder::new("db", Severity::Error)
            .category("database")
            .meta("region", region)
            .meta("latency_ms", 100 + i)
            .at(BASE + secs(i * 60))
            .build();
        ls.learn_from_error(&e, &ExecutionContext::default());
    }
    let kb = ls.knowledge_base();
    let pattern = &kb.contexts["db:error:database"];
    let region = &pattern.categorical["region"];
    assert_eq!(region.mode, "eu");
    assert_eq!(region.distribution["eu"], 4);
    assert!(region.entropy > 0.0 && region.entropy < 1.0);
    assert_eq!(pattern.categorical["hour_of_day"].mode, "22");
    assert_eq!(pattern.categorical["hour_of_day"].entropy, 0.0);
    assert!(pattern.numeric.contains_key("latency_ms"));
    // Category is the grouping key, not a feature.
    assert!(!pattern.categorical.contains_key("category"));
}

#[test]
fn categories_are_learned_separately() {
    let mut ls = LearningSystem::default();
    ls.learn_from_error(&db_event(BASE), &ExecutionContext::default());
    let other = EventBuilder::new("db", Severity::Error)
        .category("network")
        .at(BASE)
        .build();
    ls.learn_from_error(&other, &ExecutionContext::default());
    assert_eq!(ls.stats().context_groups, 2);
}

#[test]
fn well_sampled_context_is_recommended_with_unusual_features() {
    let mut ls = LearningSystem::default();
    for i in 0..20 {
        ls.learn_from_error(&db_event(BASE + i * 2 * MINUTE_MS), &load(1.0));
    }
    let probe = db_event(BASE + 39 * MINUTE_MS);
    let recs = ls.recommendations_with_context(&probe, &load(5.0));
    let context = recs
        .iter()
        .find_map(|r| match r {
            Recommendation::ContextPattern {
                confidence,
                unusual,
                dominant,
                ..
            } => Some((*confidence, unusual.clone(), dominant.clone())),
            _ => None,
        })
        .expect("context recommendation");
    assert!(context.0 >= 0.5);
    assert_eq!(context.1, vec!["system_load".to_string()]);
    assert_eq!(context.2["hour_of_day"], "22");
}

#[test]
fn samples_leave_the_rolling_window() {
    let mut ls = LearningSystem::default();
    for i in 0..5 {
        ls.learn_from_error(&db_event(BASE + secs(i)), &ExecutionContext::default());
    }
    ls.learn_from_error(&db_event(BASE + 2 * 3_600_000), &ExecutionContext::default());
    // The earlier five fell out of the one-hour window, leaving too few samples.
    assert!(!ls.knowledge_base().contexts.contains_key("db:error:database"));
    assert_eq!(ls.stats().context_groups, 1);

    ls.cleanup(BASE + 4 * 3_600_000);
    assert_eq!(ls.stats().context_groups, 0);
}

// ── Periodicity ──────────────────────────────────────────────────────────

#[test]
fn periodicity_from_regular_series() {
    let mut ls = LearningSystem::default();
    for k in 0..5 {
        ls.learn_from_error(&db_event(BASE + k * 10 * MINUTE_MS), &ExecutionContext::default());
    }
    let kb = ls.knowledge_base();
    let p = &kb.patterns["db:error"];
    assert!(close(p.mean_interval_ms, 600_000.0));
    assert!(close(p.interval_variance, 0.0));
    assert_eq!(p.peak_hours, vec![22]);
    assert!(close(p.periodicity_strength, 1.0));
    assert!(close(p.confidence, 0.25));
}

#[test]
fn peak_hour_strength_is_share_of_samples() {
    let mut ls = LearningSystem::default();
    for minutes in [0, 10, 50, 60, 70] {
        ls.learn_from_error(&db_event(BASE + minutes * MINUTE_MS), &ExecutionContext::default());
    }
    let p = &ls.knowledge_base().patterns["db:error"];
    assert_eq!(p.peak_hours, vec![23]);
    assert!(close(p.periodicity_strength, 0.6));
}

// ── Thresholds ───────────────────────────────────────────────────────────

#[test]
fn threshold_moves_toward_observed_rate() {
    let mut ls = LearningSystem::default();
    ls.learn_from_error(&db_event(BASE), &ExecutionContext::default());
    assert!(close(ls.knowledge_base().thresholds["db"].rate_per_hour, 1.0));

    ls.learn_from_error(&db_event(BASE + MINUTE_MS), &ExecutionContext::default());
    // Observed 2 vs stored 1: 100% apart, so 1 + 0.1·(2 − 1).
    assert!(close(ls.knowledge_base().thresholds["db"].rate_per_hour, 1.1));

    ls.learn_from_error(&db_event(BASE + 2 * MINUTE_MS), &ExecutionContext::default());
    assert!(close(ls.knowledge_base().thresholds["db"].rate_per_hour, 1.29));
    assert_eq!(ls.stats().threshold_adjustments, 3);
}

#[test]
fn threshold_recommendation_waits_for_confidence() {
    let mut ls = LearningSystem::default();
    for i in 0..20 {
        ls.learn_from_error(&db_event(BASE + i * MINUTE_MS), &ExecutionContext::default());
    }
    let probe = db_event(BASE + 20 * MINUTE_MS);
    assert!(!ls
        .recommendations(&probe)
        .iter()
        .any(|r| r.kind() == "threshold"));

    for i in 20..35 {
        ls.learn_from_error(&db_event(BASE + i * MINUTE_MS), &ExecutionContext::default());
    }
    let probe = db_event(BASE + 35 * MINUTE_MS);
    let threshold = ls
        .recommendations(&probe)
        .into_iter()
        .find(|r| r.kind() == "threshold")
        .expect("threshold recommendation");
    match threshold {
        Recommendation::Threshold {
            current_rate,
            rate_per_hour,
            exceeded,
            confidence,
            ..
        } => {
            assert_eq!(current_rate, 35.0);
            assert!(rate_per_hour < current_rate);
            assert!(exceeded);
            assert!(close(confidence, 0.35));
        }
        other => panic!("unexpected {other:?}"),
    }
}

// ── Recovery ─────────────────────────────────────────────────────────────

fn attempt(ls: &mut LearningSystem, at: i64, strategy: &str, success: bool) {
    let ctx = ExecutionContext::default().with_recovery(strategy, success);
    ls.learn_from_error(&db_event(at), &ctx);
}

fn recovery(ls: &LearningSystem, at: i64) -> Option<(String, f64)> {
    ls.recommendations(&db_event(at))
        .into_iter()
        .find_map(|r| match r {
            Recommendation::Recovery {
                strategy,
                success_rate,
                ..
            } => Some((strategy, success_rate)),
            _ => None,
        })
}

#[test]
fn best_strategy_needs_three_attempts() {
    let mut ls = LearningSystem::default();
    attempt(&mut ls, BASE, "restart", true);
    attempt(&mut ls, BASE + 1, "restart", true);
    attempt(&mut ls, BASE + 2, "failover", true);
    attempt(&mut ls, BASE + 3, "failover", true);
    assert!(recovery(&ls, BASE + 4).is_none());

    attempt(&mut ls, BASE + 4, "restart", false);
    let (strategy, rate) = recovery(&ls, BASE + 5).unwrap();
    assert_eq!(strategy, "restart");
    assert!(close(rate, 2.0 / 3.0));

    attempt(&mut ls, BASE + 5, "failover", true);
    assert_eq!(recovery(&ls, BASE + 6).unwrap().0, "failover");
    assert_eq!(ls.stats().recovery_attempts, 6);
}

#[test]
fn unreliable_strategy_is_not_recommended() {
    let mut ls = LearningSystem::default();
    for (i, ok) in [false, false, true].into_iter().enumerate() {
        attempt(&mut ls, BASE + i as i64, "retry", ok);
    }
    assert!(recovery(&ls, BASE + 10).is_none());
}

// ── Knowledge base ───────────────────────────────────────────────────────

#[test]
fn knowledge_base_serializes() {
    let mut ls = LearningSystem::default();
    for i in 0..5 {
        attempt(&mut ls, BASE + i * MINUTE_MS, "restart", true);
    }
    let kb = ls.knowledge_base();
    let json: serde_json::Value = serde_json::from_str(&kb.to_json().unwrap()).unwrap();
    assert!(json["contexts"]["db:error:database"]["confidence"].is_number());
    assert_eq!(json["recovery"]["db:error"]["restart"]["attempts"], 5);
    assert_eq!(json["thresholds"]["db"]["samples"], 5);
}

proptest! {
    #[test]
    fn context_confidence_is_bounded(
        samples in 1usize..500,
        span in 0i64..10_000_000,
        distinct_seed in 1usize..6,
    ) {
        let distinct = distinct_seed.min(samples);
        let c = context_confidence(samples, span, 3_600_000, distinct);
        prop_assert!((0.0..=1.0).contains(&c));
    }
}
