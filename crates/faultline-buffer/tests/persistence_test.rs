use std::path::Path;

use faultline_buffer::persistence;
use faultline_buffer::BufferManager;
use faultline_core::config::BufferConfig;
use faultline_core::Severity;
use test_fixtures::EventBuilder;

fn file_config(dir: &Path) -> BufferConfig {
    BufferConfig {
        log_dir: dir.join("logs").display().to_string(),
        archive_dir: dir.join("logs").join("archive").display().to_string(),
        state_path: dir.join("state").join("error-state.json").display().to_string(),
        ..Default::default()
    }
}

#[test]
fn open_creates_empty_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let m = BufferManager::open(config.clone());
    assert!(Path::new(&config.state_path).exists());
    assert_eq!(m.stats().main_size, 0);

    let state = persistence::load(Path::new(&config.state_path))
        .unwrap()
        .expect("state present");
    assert!(state.is_empty());
    assert!(!state.timestamp.is_empty());
}

#[test]
fn state_round_trip_restores_buffers_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let (recent_ids, priority_ids) = {
        let mut m = BufferManager::open(config.clone());
        for (module, severity, at) in [
            ("db", Severity::Critical, 10),
            ("api", Severity::Error, 20),
            ("api", Severity::Info, 30),
        ] {
            assert!(m.add_error(EventBuilder::new(module, severity).at_secs(at).record()));
        }
        m.persist().expect("persist");
        let recent: Vec<String> = m.recent_errors(10).iter().map(|e| e.id.clone()).collect();
        let priority: Vec<String> = m.critical_errors(10).iter().map(|e| e.id.clone()).collect();
        (recent, priority)
    };

    let restored = BufferManager::open(config);
    let recent: Vec<String> = restored.recent_errors(10).iter().map(|e| e.id.clone()).collect();
    let priority: Vec<String> = restored
        .critical_errors(10)
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(recent, recent_ids);
    assert_eq!(priority, priority_ids);

    let stats = restored.stats();
    assert_eq!(stats.counters.total_errors, 3);
    assert_eq!(stats.counters.by_module.get("api"), Some(&2));
    assert_eq!(stats.main_size, 3);
    assert_eq!(restored.errors_by_module("api", 10).len(), 2);
}

#[test]
fn only_trailing_main_entries_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let config = BufferConfig {
        persist_main_entries: 2,
        ..file_config(dir.path())
    };
    let mut m = BufferManager::open(config);
    for at in 0..5 {
        m.add_error(EventBuilder::new("api", Severity::Info).at_secs(at).record());
    }
    let state = m.snapshot_state();
    assert_eq!(state.buffers.main.len(), 2);
    assert_eq!(state.buffers.main[1].timestamp, 4_000);
    assert_eq!(state.buffers.recent.len(), 5);
    assert!(state.buffers.priority.is_empty());
}

#[test]
fn corrupt_state_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    std::fs::create_dir_all(Path::new(&config.state_path).parent().unwrap()).unwrap();
    std::fs::write(&config.state_path, "{not json").unwrap();

    let mut m = BufferManager::open(config.clone());
    assert_eq!(m.stats().main_size, 0);
    assert!(m.add_error(EventBuilder::new("api", Severity::Error).record()));

    // The next persist replaces the corrupt file.
    m.shutdown();
    let state = persistence::load(Path::new(&config.state_path))
        .unwrap()
        .expect("state present");
    assert_eq!(state.stats.total_errors, 1);
}
