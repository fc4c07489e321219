use std::fs;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use faultline_buffer::BufferManager;
use faultline_core::config::{BufferConfig, CompressionCodec};
use faultline_core::Severity;
use flate2::read::GzDecoder;
use test_fixtures::EventBuilder;

fn config(dir: &Path, max_log_bytes: u64, max_archive_files: usize) -> BufferConfig {
    BufferConfig {
        log_dir: dir.join("logs").display().to_string(),
        archive_dir: dir.join("archive").display().to_string(),
        state_path: dir.join("error-state.json").display().to_string(),
        max_log_bytes,
        max_archive_files,
        ..Default::default()
    }
}

fn archives(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir.join("archive"))
        .map(|rd| rd.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    files.sort();
    files
}

#[test]
fn log_lines_are_json_with_expected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(config(dir.path(), 50 * 1024 * 1024, 10));
    let event = m
        .ingest(
            EventBuilder::new("db", Severity::Critical)
                .message("disk full")
                .category("filesystem")
                .record(),
        )
        .unwrap();
    m.flush_logs();

    for name in ["errors.log", "critical.log"] {
        let file = fs::File::open(dir.path().join("logs").join(name)).unwrap();
        let line = BufReader::new(file).lines().next().unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["id"], event.id.as_str());
        assert_eq!(json["level"], "critical");
        assert_eq!(json["module"], "db");
        assert_eq!(json["message"], "disk full");
        assert_eq!(json["metadata"]["category"], "filesystem");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00.000Z");
        assert!(json.get("stack").is_none());
    }
}

#[test]
fn non_critical_events_skip_critical_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(config(dir.path(), 50 * 1024 * 1024, 10));
    m.add_error(EventBuilder::new("api", Severity::Error).record());
    m.flush_logs();
    let critical = fs::metadata(dir.path().join("logs").join("critical.log")).unwrap();
    assert_eq!(critical.len(), 0);
}

#[test]
fn exceeding_ceiling_rotates_into_one_compressed_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(config(dir.path(), 150, 10));
    let event = m
        .ingest(
            EventBuilder::new("api", Severity::Error)
                .message("request failed after retries exhausted on upstream gateway")
                .record(),
        )
        .unwrap();
    assert!(m.stats().rotation_pending);

    let archived = m.check_rotation();
    assert_eq!(archived.len(), 1);
    assert_eq!(archives(dir.path()), archived);

    let name = archived[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("errors-"), "{name}");
    assert!(name.ends_with(".log.gz"), "{name}");

    let active = fs::metadata(dir.path().join("logs").join("errors.log")).unwrap();
    assert_eq!(active.len(), 0);

    let mut content = String::new();
    GzDecoder::new(fs::File::open(&archived[0]).unwrap())
        .read_to_string(&mut content)
        .unwrap();
    assert!(content.contains(&event.id));

    let stats = m.stats();
    assert!(!stats.rotation_pending);
    assert_eq!(stats.counters.rotations, 1);
    assert!(stats.counters.last_rotation.is_some());
}

#[test]
fn archive_directory_is_pruned_to_max_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(config(dir.path(), 100, 1));
    for round in 0..3 {
        m.add_error(
            EventBuilder::new("api", Severity::Warn)
                .message(&format!("slow response from inventory service, round {round}"))
                .record(),
        );
        assert_eq!(m.check_rotation().len(), 1);
        assert_eq!(archives(dir.path()).len(), 1);
    }
    assert_eq!(m.stats().counters.rotations, 3);
}

#[test]
fn below_ceiling_nothing_rotates() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(config(dir.path(), 1024 * 1024, 10));
    m.add_error(EventBuilder::new("api", Severity::Warn).record());
    assert!(m.check_rotation().is_empty());
    assert!(archives(dir.path()).is_empty());
}

#[test]
fn zstd_archives_use_zst_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(BufferConfig {
        compression: CompressionCodec::Zstd,
        ..config(dir.path(), 100, 10)
    });
    m.add_error(
        EventBuilder::new("db", Severity::Critical)
            .message("connection pool exhausted on replica")
            .record(),
    );
    let archived = m.check_rotation();
    // Both the active and the critical stream crossed the ceiling.
    assert_eq!(archived.len(), 2);
    assert!(archived.iter().all(|p| p.to_string_lossy().ends_with(".log.zst")));
    assert!(archived
        .iter()
        .any(|p| p.file_name().unwrap().to_string_lossy().starts_with("critical-")));

    let decoded = zstd::stream::decode_all(fs::File::open(&archived[0]).unwrap()).unwrap();
    assert!(!decoded.is_empty());
}

#[test]
fn uncompressed_archives_when_compression_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut m = BufferManager::open(BufferConfig {
        compress_archives: false,
        ..config(dir.path(), 100, 10)
    });
    m.add_error(
        EventBuilder::new("api", Severity::Error)
            .message("upstream gateway returned 502 bad gateway")
            .record(),
    );
    let archived = m.check_rotation();
    assert_eq!(archived.len(), 1);
    assert!(archived[0].to_string_lossy().ends_with(".log"));
}
