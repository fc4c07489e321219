use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use faultline_core::errors::BufferError;

/// An append-only log file that tracks how many bytes it holds.
#[derive(Debug)]
pub struct LogStream {
    path: PathBuf,
    /// Archive file name prefix, e.g. `errors`.
    prefix: &'static str,
    writer: Option<BufWriter<File>>,
    bytes: u64,
}

impl LogStream {
    pub fn open(path: PathBuf, prefix: &'static str) -> Result<Self, BufferError> {
        let mut stream = Self {
            path,
            prefix,
            writer: None,
            bytes: 0,
        };
        stream.reopen()?;
        Ok(stream)
    }

    /// (Re)open the file for appending, picking up its current length.
    pub fn reopen(&mut self) -> Result<(), BufferError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        self.bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    pub fn append(&mut self, line: &[u8]) -> Result<(), BufferError> {
        if self.writer.is_none() {
            self.reopen()?;
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(BufferError::LogWrite {
                path: self.path.display().to_string(),
                reason: "stream closed".to_string(),
            });
        };
        writer.write_all(line).map_err(|e| BufferError::LogWrite {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.bytes += line.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), BufferError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush().map_err(|e| BufferError::LogWrite {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Flush and close the file handle.
    pub fn close(&mut self) -> Result<(), BufferError> {
        self.flush()?;
        self.writer = None;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn exceeds(&self, max_bytes: u64) -> bool {
        self.bytes >= max_bytes
    }

    fn write_error(&self, e: std::io::Error) -> BufferError {
        BufferError::LogWrite {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}
