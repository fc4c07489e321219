//! Built-in alert channels.

use std::sync::Mutex;

use faultline_core::errors::{FaultlineResult, PredictionError};
use faultline_core::traits::IAlertChannel;
use faultline_core::Alert;
use tracing::warn;

/// Emits each alert as a structured `warn!` event.
#[derive(Debug, Default)]
pub struct TracingAlertChannel;

impl IAlertChannel for TracingAlertChannel {
    fn name(&self) -> &str {
        "tracing"
    }

    fn deliver(&self, alert: &Alert) -> FaultlineResult<()> {
        warn!(
            event = "alert",
            severity = ?alert.severity,
            module = %alert.module,
            confidence = alert.confidence,
            time_to_error = %alert.time_to_error,
            prediction_id = %alert.prediction_id,
            "{}",
            alert.message
        );
        Ok(())
    }
}

/// Keeps delivered alerts in memory, for dashboards and tests.
#[derive(Debug, Default)]
pub struct MemoryAlertChannel {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IAlertChannel for MemoryAlertChannel {
    fn name(&self) -> &str {
        "memory"
    }

    fn deliver(&self, alert: &Alert) -> FaultlineResult<()> {
        let mut alerts = self
            .alerts
            .lock()
            .map_err(|_| PredictionError::AlertDelivery {
                channel: self.name().to_string(),
                reason: "alert store poisoned".to_string(),
            })?;
        alerts.push(alert.clone());
        Ok(())
    }
}
