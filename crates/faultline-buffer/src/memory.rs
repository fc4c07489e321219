//! Process and system memory sampling for event enrichment.

use std::time::{Duration, Instant};

use faultline_core::MemorySnapshot;
use sysinfo::{Pid, System};

/// Samples are reused for this long before `sysinfo` is refreshed again.
const SAMPLE_TTL: Duration = Duration::from_secs(1);

pub struct MemoryProbe {
    system: System,
    pid: Option<Pid>,
    last: Option<(Instant, MemorySnapshot)>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
            last: None,
        }
    }

    pub fn sample(&mut self) -> MemorySnapshot {
        if let Some((at, snapshot)) = self.last {
            if at.elapsed() < SAMPLE_TTL {
                return snapshot;
            }
        }

        self.system.refresh_memory();
        let process_bytes = match self.pid {
            Some(pid) if self.system.refresh_process(pid) => {
                self.system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            _ => 0,
        };
        let snapshot = MemorySnapshot {
            process_bytes,
            system_used_bytes: self.system.used_memory(),
        };
        self.last = Some((Instant::now(), snapshot));
        snapshot
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProbe")
            .field("pid", &self.pid)
            .field("last", &self.last.map(|(_, s)| s))
            .finish()
    }
}
