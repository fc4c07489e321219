use std::fs;
use std::path::{Path, PathBuf};

use faultline_core::config::{BufferConfig, CompressionCodec};
use faultline_core::constants::{ACTIVE_LOG_FILENAME, CRITICAL_LOG_FILENAME};
use faultline_core::errors::BufferError;
use faultline_core::{ErrorEvent, Severity};
use tracing::{info, warn};

use super::archive;
use super::line::LogLine;
use super::stream::LogStream;

const ACTIVE_PREFIX: &str = "errors";
const CRITICAL_PREFIX: &str = "critical";

/// Writes the active and critical-only logs and rotates them into the archive.
#[derive(Debug)]
pub struct LogWriter {
    active: LogStream,
    critical: LogStream,
    archive_dir: PathBuf,
    max_bytes: u64,
    max_archive_files: usize,
    codec: Option<CompressionCodec>,
    counter: u64,
}

impl LogWriter {
    pub fn open(config: &BufferConfig) -> Result<Self, BufferError> {
        let log_dir = Path::new(&config.log_dir);
        Ok(Self {
            active: LogStream::open(log_dir.join(ACTIVE_LOG_FILENAME), ACTIVE_PREFIX)?,
            critical: LogStream::open(log_dir.join(CRITICAL_LOG_FILENAME), CRITICAL_PREFIX)?,
            archive_dir: PathBuf::from(&config.archive_dir),
            max_bytes: config.max_log_bytes,
            max_archive_files: config.max_archive_files,
            codec: config.compress_archives.then_some(config.compression),
            counter: 0,
        })
    }

    /// Append one event. Returns the bytes written across both streams.
    pub fn write(&mut self, event: &ErrorEvent) -> Result<u64, BufferError> {
        let bytes = LogLine::from(event)
            .to_bytes()
            .map_err(|e| BufferError::LogWrite {
                path: self.active.path().display().to_string(),
                reason: e.to_string(),
            })?;
        self.active.append(&bytes)?;
        let mut written = bytes.len() as u64;
        if event.severity == Severity::Critical {
            self.critical.append(&bytes)?;
            written += bytes.len() as u64;
        }
        Ok(written)
    }

    pub fn flush(&mut self) -> Result<(), BufferError> {
        self.active.flush()?;
        self.critical.flush()
    }

    /// Whether any stream has crossed the byte ceiling.
    pub fn rotation_due(&self) -> bool {
        self.active.exceeds(self.max_bytes) || self.critical.exceeds(self.max_bytes)
    }

    pub fn active_path(&self) -> &Path {
        self.active.path()
    }

    pub fn critical_path(&self) -> &Path {
        self.critical.path()
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Rotate every stream over the ceiling. Returns the archived file paths.
    ///
    /// A stream whose rotation fails stays open and is retried on the next call.
    pub fn rotate_if_needed(&mut self, now_ms: i64) -> Result<Vec<PathBuf>, BufferError> {
        let mut archived = Vec::new();
        let mut first_error = None;

        for critical in [false, true] {
            let stream = if critical {
                &mut self.critical
            } else {
                &mut self.active
            };
            if !stream.exceeds(self.max_bytes) {
                continue;
            }
            self.counter += 1;
            match rotate_stream(stream, &self.archive_dir, self.codec, now_ms, self.counter) {
                Ok(path) => archived.push(path),
                Err(e) => {
                    warn!(error = %e, path = %stream.path().display(), "log rotation failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if !archived.is_empty() {
            match archive::prune(
                &self.archive_dir,
                &[ACTIVE_PREFIX, CRITICAL_PREFIX],
                self.max_archive_files,
            ) {
                Ok(removed) if !removed.is_empty() => {
                    info!(removed = removed.len(), "pruned log archive");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "archive pruning failed"),
            }
        }

        match first_error {
            Some(e) if archived.is_empty() => Err(e),
            _ => Ok(archived),
        }
    }
}

fn rotate_stream(
    stream: &mut LogStream,
    archive_dir: &Path,
    codec: Option<CompressionCodec>,
    now_ms: i64,
    counter: u64,
) -> Result<PathBuf, BufferError> {
    let rotation_error = |path: &Path, e: std::io::Error| BufferError::Rotation {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    fs::create_dir_all(archive_dir).map_err(|e| rotation_error(archive_dir, e))?;
    stream.close()?;

    let target = archive_dir.join(archive::archive_name(stream.prefix(), now_ms, counter));
    if let Err(e) = fs::rename(stream.path(), &target) {
        stream.reopen()?;
        return Err(rotation_error(stream.path(), e));
    }
    stream.reopen()?;

    let archived = match codec {
        Some(codec) => match archive::compress(&target, codec) {
            Ok(compressed) => compressed,
            Err(e) => {
                warn!(error = %e, "archive compression failed, keeping uncompressed file");
                target
            }
        },
        None => target,
    };
    info!(
        event = "log_rotated",
        archive = %archived.display(),
        "rotated log stream"
    );
    Ok(archived)
}
