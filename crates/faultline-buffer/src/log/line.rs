use faultline_core::{time, ErrorEvent, Metadata, Severity};
use serde::Serialize;

/// One line of the active log: `{timestamp, level, module, message, stack?, metadata, id}`.
#[derive(Debug, Serialize)]
pub struct LogLine<'a> {
    pub timestamp: String,
    pub level: Severity,
    pub module: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<&'a str>,
    pub metadata: &'a Metadata,
    pub id: &'a str,
}

impl<'a> From<&'a ErrorEvent> for LogLine<'a> {
    fn from(event: &'a ErrorEvent) -> Self {
        Self {
            timestamp: time::to_rfc3339(event.timestamp),
            level: event.severity,
            module: &event.module,
            message: &event.message,
            stack: event.stack.as_deref(),
            metadata: &event.metadata,
            id: &event.id,
        }
    }
}

impl LogLine<'_> {
    /// Serialized line including the trailing newline.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
