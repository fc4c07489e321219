//! Buffer state file: `{timestamp, buffers: {main, recent, priority}, stats}`.

use std::fs;
use std::io::Write;
use std::path::Path;

use faultline_core::errors::BufferError;
use faultline_core::ErrorEvent;
use serde::{Deserialize, Serialize};

use crate::stats::BufferCounters;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedBuffers {
    pub main: Vec<ErrorEvent>,
    pub recent: Vec<ErrorEvent>,
    pub priority: Vec<ErrorEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// ISO 8601 time the state was written.
    pub timestamp: String,
    pub buffers: PersistedBuffers,
    pub stats: BufferCounters,
}

impl PersistedState {
    pub fn is_empty(&self) -> bool {
        self.buffers.main.is_empty()
            && self.buffers.recent.is_empty()
            && self.buffers.priority.is_empty()
    }
}

/// Write `state` to a sibling temp file, then rename it over `path`.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), BufferError> {
    let fail = |e: &dyn std::fmt::Display| BufferError::Persistence {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(&e))?;
    }
    let json = serde_json::to_vec_pretty(state).map_err(|e| fail(&e))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);
    {
        let mut file = fs::File::create(tmp).map_err(|e| fail(&e))?;
        file.write_all(&json).map_err(|e| fail(&e))?;
        file.sync_all().map_err(|e| fail(&e))?;
    }
    fs::rename(tmp, path).map_err(|e| fail(&e))
}

/// Load the state file. `Ok(None)` when it does not exist.
pub fn load(path: &Path) -> Result<Option<PersistedState>, BufferError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BufferError::Persistence {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(Some(PersistedState::default()));
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| BufferError::StateCorrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
