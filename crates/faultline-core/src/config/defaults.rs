// Single source of truth for all default values.

// --- Classification ---
pub const DEFAULT_DUPLICATE_WINDOW_SECS: u64 = 60;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CLASSIFICATION_CACHE_SIZE: usize = 1_000;
pub const DEFAULT_SUPPRESS_DUPLICATES: bool = false;

// --- Buffer ---
pub const DEFAULT_MAIN_CAPACITY: usize = 1_000;
pub const DEFAULT_RECENT_WINDOW_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_PRIORITY_CAPACITY: usize = 100;
pub const DEFAULT_TEMPORAL_FLUSH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_ARCHIVE_DIR: &str = "logs/archive";
pub const DEFAULT_FILE_LOGGING: bool = true;
pub const DEFAULT_MAX_LOG_BYTES: u64 = 52_428_800; // 50 MB
pub const DEFAULT_MAX_ARCHIVE_FILES: usize = 10;
pub const DEFAULT_COMPRESS_ARCHIVES: bool = true;
pub const DEFAULT_ROTATION_CHECK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_STATE_FILENAME: &str = "logs/error-state.json";
pub const DEFAULT_PERSIST_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_PERSIST_MAIN_ENTRIES: usize = 100;
pub const DEFAULT_INDEX_REBUILD_INTERVAL_SECS: u64 = 600;

// --- Analysis ---
pub const DEFAULT_MIN_OCCURRENCES: usize = 3;
pub const DEFAULT_TEMPORAL_WINDOWS_SECS: [u64; 4] = [60, 300, 900, 3_600];
pub const DEFAULT_CORRELATION_WINDOW_SECS: u64 = 300;
pub const DEFAULT_CORRELATION_MAX_AGE_SECS: u64 = 86_400; // 24 hours
pub const DEFAULT_TREND_WINDOW_SECS: u64 = 3_600;
pub const DEFAULT_TREND_SEGMENTS: usize = 6;
pub const DEFAULT_MAX_PATTERNS: usize = 1_000;
pub const DEFAULT_ANALYSIS_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_ANALYSIS_HISTORY_CAPACITY: usize = 5_000;
pub const DEFAULT_MAX_ANOMALIES: usize = 100;

// --- Learning ---
pub const DEFAULT_CONTEXT_WINDOW_SECS: u64 = 3_600;
pub const DEFAULT_MIN_SAMPLES: usize = 5;
pub const DEFAULT_PATTERN_WINDOW_SECS: u64 = 86_400;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_THRESHOLD_CHANGE_RATIO: f64 = 0.3;
pub const DEFAULT_MIN_RECOVERY_ATTEMPTS: u64 = 3;
pub const DEFAULT_CONTEXT_CONFIDENCE_CUTOFF: f64 = 0.5;
pub const DEFAULT_RECOVERY_SUCCESS_CUTOFF: f64 = 0.5;
pub const DEFAULT_THRESHOLD_CONFIDENCE_CUTOFF: f64 = 0.3;

// --- Prediction ---
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.25;
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;
pub const DEFAULT_VERIFICATION_WINDOW_SECS: u64 = 600; // 10 minutes
pub const DEFAULT_MERGE_WINDOW_SECS: u64 = 300;
pub const DEFAULT_PREDICTION_HISTORY_CAPACITY: usize = 1_000;
pub const DEFAULT_EVENT_HISTORY_CAPACITY: usize = 2_000;
pub const DEFAULT_SEQUENCE_WINDOW_SECS: u64 = 600;
pub const DEFAULT_SEQUENCE_DELAY_SECS: u64 = 300;
pub const DEFAULT_CASCADE_WINDOW_SECS: u64 = 300;
pub const DEFAULT_CASCADE_RISK_THRESHOLD: f64 = 0.6;
pub const DEFAULT_CASCADE_DELAY_SECS: u64 = 120;
pub const DEFAULT_EXPIRY_INTERVAL_SECS: u64 = 60;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;
