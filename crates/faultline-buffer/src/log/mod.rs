//! JSON-lines log files with size-based rotation into a compressed archive.

pub mod archive;
pub mod line;
pub mod stream;
pub mod writer;

pub use line::LogLine;
pub use stream::LogStream;
pub use writer::LogWriter;
