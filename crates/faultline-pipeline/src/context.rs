//! Execution context sampled from the host.

use std::sync::Mutex;

use faultline_core::traits::IContextSupplier;
use faultline_core::ExecutionContext;
use sysinfo::System;

/// Captures load average and memory usage via `sysinfo`. Hour of day is left to
/// the learning system, which takes it from the event timestamp.
pub struct SystemContextSupplier {
    system: Mutex<System>,
}

impl SystemContextSupplier {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemContextSupplier {
    fn default() -> Self {
        Self::new()
    }
}

impl IContextSupplier for SystemContextSupplier {
    fn capture(&self) -> ExecutionContext {
        let memory_usage = self.system.lock().ok().and_then(|mut system| {
            system.refresh_memory();
            let total = system.total_memory();
            (total > 0).then(|| system.used_memory() as f64 / total as f64)
        });
        let load = System::load_average();
        ExecutionContext {
            system_load: load.one.is_finite().then_some(load.one),
            memory_usage,
            active_connections: None,
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for SystemContextSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContextSupplier").finish_non_exhaustive()
    }
}
