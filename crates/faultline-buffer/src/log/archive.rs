//! Archive naming, compression and retention.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use faultline_core::config::CompressionCodec;
use faultline_core::errors::BufferError;
use faultline_core::time;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

const ZSTD_LEVEL: i32 = 3;

/// `<prefix>-<ISO8601>-<counter>.log`, with `:` and `.` in the timestamp made filename-safe.
pub fn archive_name(prefix: &str, now_ms: i64, counter: u64) -> String {
    let stamp = time::to_rfc3339(now_ms).replace([':', '.'], "-");
    format!("{prefix}-{stamp}-{counter}.log")
}

/// Compress `source` next to itself and remove the original.
pub fn compress(source: &Path, codec: CompressionCodec) -> Result<PathBuf, BufferError> {
    let mut target = source.as_os_str().to_owned();
    target.push(".");
    target.push(codec.extension());
    let target = PathBuf::from(target);

    let fail = |e: io::Error| BufferError::Compression {
        path: source.display().to_string(),
        reason: e.to_string(),
    };

    let result = (|| -> io::Result<()> {
        let mut input = BufReader::new(File::open(source)?);
        let output = BufWriter::new(File::create(&target)?);
        match codec {
            CompressionCodec::Gzip => {
                let mut encoder = GzEncoder::new(output, Compression::default());
                io::copy(&mut input, &mut encoder)?;
                encoder.finish()?.flush()?;
            }
            CompressionCodec::Zstd => {
                let mut encoder = zstd::stream::write::Encoder::new(output, ZSTD_LEVEL)?;
                io::copy(&mut input, &mut encoder)?;
                encoder.finish()?.flush()?;
            }
        }
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&target);
        return Err(fail(e));
    }
    fs::remove_file(source).map_err(fail)?;
    Ok(target)
}

/// Whether `name` is an archive produced by one of `prefixes`.
fn is_archive(name: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|p| name.starts_with(p) && name.as_bytes().get(p.len()) == Some(&b'-'))
        && name.contains(".log")
}

/// Delete the oldest archives (by modification time) until at most `max_files` remain.
pub fn prune(dir: &Path, prefixes: &[&str], max_files: usize) -> io::Result<Vec<PathBuf>> {
    let mut archives: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !is_archive(&name.to_string_lossy(), prefixes) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        archives.push((modified, entry.path()));
    }

    if archives.len() <= max_files {
        return Ok(Vec::new());
    }
    archives.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let excess = archives.len() - max_files;
    let mut removed = Vec::with_capacity(excess);
    for (_, path) in archives.into_iter().take(excess) {
        fs::remove_file(&path)?;
        debug!(path = %path.display(), "pruned archived log");
        removed.push(path);
    }
    Ok(removed)
}
