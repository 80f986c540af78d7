//! Debugger trace appender
//!
//! On Windows lines go to `OutputDebugStringW`. Elsewhere there is no
//! debugger trace stream, so lines go to stderr. Either target can be
//! replaced by an arbitrary writer.

use crate::core::{Appender, LogLevel, LoggerError, Result};
use std::io::{self, Write};

enum Target {
    Native,
    Writer(Box<dyn Write + Send>),
}

pub struct DebuggerAppender {
    target: Target,
}

impl DebuggerAppender {
    pub fn new() -> Self {
        Self {
            target: Target::Native,
        }
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            target: Target::Writer(Box::new(writer)),
        }
    }
}

impl Default for DebuggerAppender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
fn output_debug_string(line: &str) -> io::Result<()> {
    use windows_sys::Win32::System::Diagnostics::Debug::OutputDebugStringW;

    let wide: Vec<u16> = line
        .encode_utf16()
        .chain("\r\n".encode_utf16())
        .chain(std::iter::once(0))
        .collect();
    // SAFETY: `wide` is a NUL-terminated UTF-16 buffer that outlives the call.
    unsafe { OutputDebugStringW(wide.as_ptr()) };
    Ok(())
}

#[cfg(not(windows))]
fn output_debug_string(line: &str) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    stderr.write_all(line.as_bytes())?;
    stderr.write_all(b"\n")
}

impl Appender for DebuggerAppender {
    fn append(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        let result = match self.target {
            Target::Native => output_debug_string(line),
            Target::Writer(ref mut writer) => writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.write_all(b"\n")),
        };
        result.map_err(|e| LoggerError::sink_write("debugger", e))
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            Target::Native => Ok(()),
            Target::Writer(ref mut writer) => writer
                .flush()
                .map_err(|e| LoggerError::sink_write("debugger", e)),
        }
    }

    fn name(&self) -> &str {
        "debugger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryWriter;

    #[test]
    fn test_custom_writer() {
        let capture = MemoryWriter::new();
        let mut appender = DebuggerAppender::with_writer(capture.clone());
        appender.append(LogLevel::Debug, "trace me").unwrap();
        assert_eq!(capture.contents(), "trace me\n");
    }
}
