//! Alert construction from confident predictions.

use faultline_core::time::{HOUR_MS, MINUTE_MS, SECOND_MS};
use faultline_core::{Alert, AlertSeverity};

use crate::prediction::Prediction;

const HIGH_BAND: f64 = 0.9;
const MEDIUM_BAND: f64 = 0.85;

/// high ≥ 0.9, medium ≥ 0.85, else low.
pub fn band_for(confidence: f64) -> AlertSeverity {
    if confidence >= HIGH_BAND {
        AlertSeverity::High
    } else if confidence >= MEDIUM_BAND {
        AlertSeverity::Medium
    } else {
        AlertSeverity::Low
    }
}

/// Human-readable lead time, e.g. `in 2 minutes`.
pub fn time_to_error(delta_ms: i64) -> String {
    let delta = delta_ms.max(0);
    let (value, unit) = if delta >= HOUR_MS {
        (delta / HOUR_MS, "hour")
    } else if delta >= MINUTE_MS {
        (delta / MINUTE_MS, "minute")
    } else {
        (delta / SECOND_MS, "second")
    };
    if value == 1 {
        format!("in 1 {unit}")
    } else {
        format!("in {value} {unit}s")
    }
}

pub fn alert_for(prediction: &Prediction, now: i64) -> Alert {
    Alert {
        severity: band_for(prediction.confidence),
        module: prediction.module.clone(),
        confidence: prediction.confidence,
        time_to_error: time_to_error(prediction.expected_at - now),
        message: format!(
            "{} model predicts a {} failure ({:.0}% confidence)",
            prediction.model,
            prediction.module,
            prediction.confidence * 100.0
        ),
        prediction_id: prediction.id.clone(),
        raised_at: now,
    }
}
