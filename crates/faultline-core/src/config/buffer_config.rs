use serde::{Deserialize, Serialize};

use super::defaults;

/// Codec used for archived log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    Gzip,
    Zstd,
}

impl CompressionCodec {
    /// File extension appended to compressed archives.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
        }
    }
}

/// Buffer manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Capacity of the circular main buffer.
    pub main_capacity: usize,
    /// Maximum age of entries in the recent buffer (seconds).
    pub recent_window_secs: u64,
    /// Capacity of the priority buffer.
    pub priority_capacity: usize,
    /// Interval between temporal buffer flushes (seconds).
    pub temporal_flush_interval_secs: u64,
    /// Events per batch handed to the batch sink.
    pub batch_size: usize,
    /// Write JSON-lines log files.
    pub file_logging: bool,
    /// Directory holding the active log files.
    pub log_dir: String,
    /// Directory receiving rotated log files.
    pub archive_dir: String,
    /// Byte ceiling that triggers rotation of a log stream.
    pub max_log_bytes: u64,
    /// Archived files retained after pruning.
    pub max_archive_files: usize,
    /// Compress archived files.
    pub compress_archives: bool,
    /// Codec used when `compress_archives` is set.
    pub compression: CompressionCodec,
    /// Interval between rotation checks (seconds).
    pub rotation_check_interval_secs: u64,
    /// Path of the persisted state file.
    pub state_path: String,
    /// Interval between state persistence runs (seconds).
    pub persist_interval_secs: u64,
    /// Number of trailing main-buffer entries written to the state file.
    pub persist_main_entries: usize,
    /// Interval between index rebuilds (seconds).
    pub index_rebuild_interval_secs: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            main_capacity: defaults::DEFAULT_MAIN_CAPACITY,
            recent_window_secs: defaults::DEFAULT_RECENT_WINDOW_SECS,
            priority_capacity: defaults::DEFAULT_PRIORITY_CAPACITY,
            temporal_flush_interval_secs: defaults::DEFAULT_TEMPORAL_FLUSH_INTERVAL_SECS,
            batch_size: defaults::DEFAULT_BATCH_SIZE,
            file_logging: defaults::DEFAULT_FILE_LOGGING,
            log_dir: defaults::DEFAULT_LOG_DIR.to_string(),
            archive_dir: defaults::DEFAULT_ARCHIVE_DIR.to_string(),
            max_log_bytes: defaults::DEFAULT_MAX_LOG_BYTES,
            max_archive_files: defaults::DEFAULT_MAX_ARCHIVE_FILES,
            compress_archives: defaults::DEFAULT_COMPRESS_ARCHIVES,
            compression: CompressionCodec::Gzip,
            rotation_check_interval_secs: defaults::DEFAULT_ROTATION_CHECK_INTERVAL_SECS,
            state_path: defaults::DEFAULT_STATE_FILENAME.to_string(),
            persist_interval_secs: defaults::DEFAULT_PERSIST_INTERVAL_SECS,
            persist_main_entries: defaults::DEFAULT_PERSIST_MAIN_ENTRIES,
            index_rebuild_interval_secs: defaults::DEFAULT_INDEX_REBUILD_INTERVAL_SECS,
        }
    }
}
