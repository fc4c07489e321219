//! Configuration system for Faultline.
//! TOML-based: compiled defaults < config file < `FAULTLINE_*` environment.

pub mod analysis_config;
pub mod buffer_config;
pub mod classification_config;
pub mod defaults;
pub mod faultline_config;
pub mod learning_config;
pub mod observability_config;
pub mod prediction_config;

pub use analysis_config::AnalysisConfig;
pub use buffer_config::{BufferConfig, CompressionCodec};
pub use classification_config::ClassificationConfig;
pub use faultline_config::FaultlineConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use prediction_config::PredictionConfig;
