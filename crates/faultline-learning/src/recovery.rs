//! Recovery strategy ranking per `{module, severity}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attempt and success counters of one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub attempts: u64,
    pub successes: u64,
    pub last_attempt: i64,
}

impl StrategyStats {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

/// Strategies tried for one key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryBook {
    strategies: BTreeMap<String, StrategyStats>,
}

impl RecoveryBook {
    pub fn record(&mut self, strategy: &str, success: bool, at: i64) {
        let stats = self.strategies.entry(strategy.to_string()).or_default();
        stats.attempts += 1;
        if success {
            stats.successes += 1;
        }
        stats.last_attempt = at;
    }

    /// Highest success rate among strategies with at least `min_attempts`.
    /// Ties go to the strategy with more attempts, then the smaller name.
    pub fn best(&self, min_attempts: u64) -> Option<(&str, &StrategyStats)> {
        self.strategies
            .iter()
            .filter(|(_, s)| s.attempts >= min_attempts)
            .max_by(|(an, a), (bn, b)| {
                a.success_rate()
                    .total_cmp(&b.success_rate())
                    .then(a.attempts.cmp(&b.attempts))
                    .then_with(|| bn.cmp(an))
            })
            .map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn strategies(&self) -> &BTreeMap<String, StrategyStats> {
        &self.strategies
    }

    pub fn attempts(&self) -> u64 {
        self.strategies.values().map(|s| s.attempts).sum()
    }
}
