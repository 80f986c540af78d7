//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// A concrete output channel. Only the worker thread calls into an appender.
pub trait Appender: Send {
    /// Write one fully decorated line; the appender adds the line terminator.
    fn append(&mut self, level: LogLevel, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
