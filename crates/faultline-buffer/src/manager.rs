//! BufferManager: single owner of every buffer, index, log stream and the state file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use faultline_core::config::BufferConfig;
use faultline_core::errors::{BufferError, FaultlineResult};
use faultline_core::traits::IBatchSink;
use faultline_core::{time, ErrorEvent, ErrorRecord, Severity};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::circular::CircularBuffer;
use crate::index::{ErrorIndexes, IndexKind};
use crate::log::LogWriter;
use crate::memory::MemoryProbe;
use crate::persistence::{self, PersistedBuffers, PersistedState};
use crate::priority::PriorityBuffer;
use crate::recent::RecentBuffer;
use crate::search::SearchCriteria;
use crate::sink::TracingBatchSink;
use crate::stats::{BufferCounters, BufferStats};
use crate::temporal::TemporalBuffer;

pub struct BufferManager {
    config: BufferConfig,
    main: CircularBuffer<Arc<ErrorEvent>>,
    /// Events currently held by the main buffer, by id. Resolves index lookups.
    live: HashMap<String, Arc<ErrorEvent>>,
    recent: RecentBuffer,
    priority: PriorityBuffer,
    temporal: TemporalBuffer,
    indexes: ErrorIndexes,
    writer: Option<LogWriter>,
    sink: Arc<dyn IBatchSink>,
    probe: MemoryProbe,
    counters: BufferCounters,
    rotation_pending: bool,
    /// Backed by log files and the state file.
    persistent: bool,
}

impl BufferManager {
    /// A memory-only manager: no log files, no state file.
    pub fn new(config: BufferConfig) -> Self {
        Self {
            main: CircularBuffer::new(config.main_capacity),
            live: HashMap::new(),
            recent: RecentBuffer::new(time::secs_to_ms(config.recent_window_secs)),
            priority: PriorityBuffer::new(config.priority_capacity),
            temporal: TemporalBuffer::default(),
            indexes: ErrorIndexes::default(),
            writer: None,
            sink: Arc::new(TracingBatchSink),
            probe: MemoryProbe::new(),
            counters: BufferCounters::default(),
            rotation_pending: false,
            persistent: false,
            config,
        }
    }

    /// A file-backed manager. Loads the state file when present, otherwise creates an
    /// empty one, and opens the log streams when file logging is enabled.
    ///
    /// Never fails: unreadable state and unopenable logs are logged and skipped.
    pub fn open(config: BufferConfig) -> Self {
        let mut manager = Self::new(config);
        manager.persistent = true;

        if manager.config.file_logging {
            manager.open_writer();
        }

        let state_path = PathBuf::from(&manager.config.state_path);
        match persistence::load(&state_path) {
            Ok(Some(state)) => {
                let restored = state.buffers.main.len();
                manager.restore(state);
                info!(
                    path = %state_path.display(),
                    restored,
                    "restored buffer state"
                );
            }
            Ok(None) => {
                let empty = PersistedState {
                    timestamp: time::to_rfc3339(time::now_ms()),
                    ..PersistedState::default()
                };
                if let Err(e) = persistence::save(&state_path, &empty) {
                    warn!(error = %e, "could not create state file");
                }
            }
            Err(e) => warn!(error = %e, "ignoring unreadable state file"),
        }
        manager
    }

    /// Replace the sink receiving temporal batches.
    pub fn with_sink(mut self, sink: Arc<dyn IBatchSink>) -> Self {
        self.set_sink(sink);
        self
    }

    pub fn set_sink(&mut self, sink: Arc<dyn IBatchSink>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    fn open_writer(&mut self) {
        match LogWriter::open(&self.config) {
            Ok(writer) => {
                self.rotation_pending = writer.rotation_due();
                self.writer = Some(writer);
            }
            Err(e) => warn!(error = %e, "file logging unavailable"),
        }
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Record a classified error. Returns false if it was rejected.
    pub fn add_error(&mut self, record: ErrorRecord) -> bool {
        match self.ingest(record) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to record error");
                false
            }
        }
    }

    /// Validate, enrich and store a classified error.
    pub fn ingest(&mut self, record: ErrorRecord) -> FaultlineResult<Arc<ErrorEvent>> {
        let event = match self.enrich(record) {
            Ok(event) => Arc::new(event),
            Err(e) => {
                self.counters.failed_ingestions += 1;
                return Err(e.into());
            }
        };

        self.insert(Arc::clone(&event));
        self.write_log(&event);
        self.counters.record(&event);
        debug!(id = %event.id, module = %event.module, severity = %event.severity, "buffered error");
        Ok(event)
    }

    fn enrich(&mut self, record: ErrorRecord) -> Result<ErrorEvent, BufferError> {
        if record.message.trim().is_empty() {
            return Err(BufferError::InvalidEvent {
                reason: "message is empty".to_string(),
            });
        }
        let module = record.module.trim();
        if module.is_empty() {
            return Err(BufferError::InvalidEvent {
                reason: "module is empty".to_string(),
            });
        }
        Ok(ErrorEvent {
            id: Uuid::new_v4().to_string(),
            timestamp: record.timestamp.unwrap_or_else(time::now_ms),
            module: module.to_string(),
            severity: record.severity,
            message: record.message,
            stack: record.stack,
            metadata: record.metadata,
            tags: record.tags,
            memory: self.probe.sample(),
        })
    }

    fn insert(&mut self, event: Arc<ErrorEvent>) {
        self.push_main(Arc::clone(&event));
        self.recent.insert(Arc::clone(&event));
        self.priority.insert(Arc::clone(&event));
        self.indexes.insert(&event);
        self.temporal.push(event);
    }

    fn push_main(&mut self, event: Arc<ErrorEvent>) {
        if let Some(evicted) = self.main.push(Arc::clone(&event)) {
            self.live.remove(&evicted.id);
        }
        self.live.insert(event.id.clone(), event);
    }

    fn write_log(&mut self, event: &ErrorEvent) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write(event) {
            Ok(bytes) => self.counters.bytes_written += bytes,
            Err(e) => {
                self.counters.log_write_failures += 1;
                warn!(error = %e, id = %event.id, "log write failed");
            }
        }
        if writer.rotation_due() {
            self.rotation_pending = true;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Search the main buffer, or the priority/recent buffer when selected.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<Arc<ErrorEvent>> {
        if criteria.priority {
            criteria.apply(self.priority.iter())
        } else if criteria.recent {
            criteria.apply(self.recent.iter())
        } else {
            criteria.apply(self.main.iter())
        }
    }

    /// Newest first.
    pub fn recent_errors(&self, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.recent.iter().rev().take(limit).cloned().collect()
    }

    /// Priority order: most severe, then newest.
    pub fn critical_errors(&self, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.priority.iter().take(limit).cloned().collect()
    }

    /// Index lookup, newest first. Ids evicted from the main buffer are skipped.
    pub fn errors_by(&self, kind: IndexKind, key: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.indexes
            .ids(kind, key)
            .iter()
            .rev()
            .filter_map(|id| self.live.get(id))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn errors_by_module(&self, module: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.errors_by(IndexKind::Module, module, limit)
    }

    pub fn errors_by_severity(&self, severity: Severity, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.errors_by(IndexKind::Severity, severity.as_str(), limit)
    }

    pub fn errors_by_category(&self, category: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.errors_by(IndexKind::Category, category, limit)
    }

    /// `hour` is a `YYYY-MM-DDTHH` bucket.
    pub fn errors_by_hour(&self, hour: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        self.errors_by(IndexKind::Hour, hour, limit)
    }

    /// Main buffer, oldest → newest.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Arc<ErrorEvent>> + '_ {
        self.main.iter()
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            counters: self.counters.clone(),
            main_size: self.main.len(),
            main_capacity: self.main.capacity(),
            recent_size: self.recent.len(),
            priority_size: self.priority.len(),
            temporal_pending: self.temporal.len(),
            indexed_modules: self.indexes.key_count(IndexKind::Module),
            indexed_hours: self.indexes.key_count(IndexKind::Hour),
            rotation_pending: self.rotation_pending,
            file_logging: self.writer.is_some(),
        }
    }

    // ── Periodic work ─────────────────────────────────────────────────────

    /// Hand pending temporal events to the batch sink and clear them.
    /// Returns the number of events flushed.
    pub fn flush_temporal(&mut self) -> usize {
        let batches = self.temporal.drain_batches(self.config.batch_size);
        let mut flushed = 0;
        for batch in &batches {
            match self.sink.process_batch(batch) {
                Ok(()) => self.counters.flushed_batches += 1,
                Err(e) => {
                    self.counters.sink_failures += 1;
                    warn!(error = %e, size = batch.len(), "batch sink failed");
                }
            }
            flushed += batch.len();
        }
        flushed
    }

    /// Rotate log streams that crossed the byte ceiling. Returns archived paths.
    pub fn check_rotation(&mut self) -> Vec<PathBuf> {
        if self.persistent && self.config.file_logging && self.writer.is_none() {
            self.open_writer();
        }
        let Some(writer) = self.writer.as_mut() else {
            return Vec::new();
        };
        if let Err(e) = writer.flush() {
            warn!(error = %e, "log flush failed");
        }

        let now = time::now_ms();
        let result = writer.rotate_if_needed(now);
        self.rotation_pending = writer.rotation_due();
        match result {
            Ok(archived) => {
                if !archived.is_empty() {
                    self.counters.rotations += archived.len() as u64;
                    self.counters.last_rotation = Some(now);
                }
                archived
            }
            Err(e) => {
                self.counters.rotation_failures += 1;
                warn!(error = %e, "log rotation failed, will retry");
                Vec::new()
            }
        }
    }

    pub fn flush_logs(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush() {
                warn!(error = %e, "log flush failed");
            }
        }
    }

    /// Rebuild all indexes from the main buffer, dropping evicted ids.
    pub fn rebuild_indexes(&mut self) {
        self.indexes.rebuild(self.main.iter().map(|e| e.as_ref()));
        debug!(modules = self.indexes.key_count(IndexKind::Module), "rebuilt indexes");
    }

    /// Drop recent-buffer entries older than the window relative to `now_ms`.
    pub fn prune_recent(&mut self, now_ms: i64) -> usize {
        self.recent.prune(now_ms)
    }

    /// Current state in the persisted layout.
    pub fn snapshot_state(&self) -> PersistedState {
        PersistedState {
            timestamp: time::to_rfc3339(time::now_ms()),
            buffers: PersistedBuffers {
                main: self
                    .main
                    .tail(self.config.persist_main_entries)
                    .map(|e| e.as_ref().clone())
                    .collect(),
                recent: self.recent.iter().map(|e| e.as_ref().clone()).collect(),
                priority: self.priority.iter().map(|e| e.as_ref().clone()).collect(),
            },
            stats: self.counters.clone(),
        }
    }

    /// Write the state file. A no-op for memory-only managers.
    pub fn persist(&mut self) -> FaultlineResult<()> {
        if !self.persistent {
            return Ok(());
        }
        let state = self.snapshot_state();
        let path = PathBuf::from(&self.config.state_path);
        match persistence::save(&path, &state) {
            Ok(()) => {
                self.counters.last_persisted = Some(time::now_ms());
                debug!(path = %path.display(), "persisted buffer state");
                Ok(())
            }
            Err(e) => {
                self.counters.persistence_failures += 1;
                warn!(error = %e, "state persistence failed");
                Err(e.into())
            }
        }
    }

    fn restore(&mut self, state: PersistedState) {
        for event in state.buffers.main {
            self.push_main(Arc::new(event));
        }
        for event in state.buffers.recent {
            let shared = self.shared(event);
            self.recent.restore(shared);
        }
        for event in state.buffers.priority {
            let shared = self.shared(event);
            self.priority.insert(shared);
        }
        self.counters = state.stats;
        self.rebuild_indexes();
    }

    /// Reuse the main buffer's allocation for an event restored into several buffers.
    fn shared(&self, event: ErrorEvent) -> Arc<ErrorEvent> {
        self.live
            .get(&event.id)
            .cloned()
            .unwrap_or_else(|| Arc::new(event))
    }

    /// Final temporal flush, log flush and persist.
    pub fn shutdown(&mut self) {
        let flushed = self.flush_temporal();
        self.flush_logs();
        if let Err(e) = self.persist() {
            warn!(error = %e, "final persist failed");
        }
        info!(flushed, total = self.counters.total_errors, "buffer manager shut down");
    }
}

impl std::fmt::Debug for BufferManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferManager")
            .field("main", &self.main.len())
            .field("recent", &self.recent.len())
            .field("priority", &self.priority.len())
            .field("temporal", &self.temporal.len())
            .field("persistent", &self.persistent)
            .finish_non_exhaustive()
    }
}
