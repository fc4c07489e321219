//! Top-level Faultline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AnalysisConfig, BufferConfig, ClassificationConfig, LearningConfig, ObservabilityConfig,
    PredictionConfig,
};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`FAULTLINE_*`)
/// 2. Config file passed to [`FaultlineConfig::load`]
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FaultlineConfig {
    pub classification: ClassificationConfig,
    pub buffer: BufferConfig,
    pub analysis: AnalysisConfig,
    pub learning: LearningConfig,
    pub prediction: PredictionConfig,
    pub observability: ObservabilityConfig,
}

impl FaultlineConfig {
    /// Load configuration from an optional TOML file, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FAULTLINE_*` environment variables. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("FAULTLINE_LOG_DIR") {
            self.buffer.archive_dir = Path::new(&dir).join("archive").display().to_string();
            self.buffer.log_dir = dir;
        }
        if let Ok(path) = std::env::var("FAULTLINE_STATE_PATH") {
            self.buffer.state_path = path;
        }
        if let Ok(level) = std::env::var("FAULTLINE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(v) = env_parse::<usize>("FAULTLINE_MAIN_CAPACITY") {
            self.buffer.main_capacity = v;
        }
        if let Some(v) = env_parse::<u64>("FAULTLINE_MAX_LOG_BYTES") {
            self.buffer.max_log_bytes = v;
        }
        if let Some(v) = env_parse::<f64>("FAULTLINE_ALERT_THRESHOLD") {
            self.prediction.alert_threshold = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("classification.similarity_threshold", self.classification.similarity_threshold)?;
        check_unit("prediction.confidence_floor", self.prediction.confidence_floor)?;
        check_unit("prediction.alert_threshold", self.prediction.alert_threshold)?;
        check_unit("prediction.cascade_risk_threshold", self.prediction.cascade_risk_threshold)?;
        check_unit("learning.learning_rate", self.learning.learning_rate)?;

        check_positive("buffer.main_capacity", self.buffer.main_capacity as u64)?;
        check_positive("buffer.priority_capacity", self.buffer.priority_capacity as u64)?;
        check_positive("buffer.batch_size", self.buffer.batch_size as u64)?;
        check_positive("buffer.max_log_bytes", self.buffer.max_log_bytes)?;
        check_positive("analysis.trend_segments", self.analysis.trend_segments as u64)?;
        check_positive("analysis.max_patterns", self.analysis.max_patterns as u64)?;
        check_positive(
            "prediction.verification_window_secs",
            self.prediction.verification_window_secs,
        )?;

        if self.analysis.temporal_windows_secs.iter().any(|w| *w == 0) {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.temporal_windows_secs".to_string(),
                message: "windows must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: "must be between 0.0 and 1.0".to_string(),
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationFailed {
            field: field.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}
