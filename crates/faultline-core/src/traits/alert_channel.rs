use crate::errors::FaultlineResult;
use crate::models::Alert;

/// A destination for predicted-failure alerts.
pub trait IAlertChannel: Send + Sync {
    /// Channel name used in logs and delivery errors.
    fn name(&self) -> &str;

    /// Deliver one alert.
    fn deliver(&self, alert: &Alert) -> FaultlineResult<()>;
}
