//! Console appender implementation

use crate::core::{Appender, LogLevel, LoggerError, Result};
use std::io::{self, Write};

/// Console stream. Defaults to stdout; any writer can stand in for it.
pub struct ConsoleAppender {
    writer: Box<dyn Write + Send>,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            writer: Box::new(io::stdout()),
            use_colors: false,
        }
    }

    /// Write to `writer` instead of stdout.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            use_colors: false,
        }
    }

    /// Color each line by level. Needs the `console` feature; ignored without it.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[cfg(feature = "console")]
    fn paint(&self, level: LogLevel, line: &str) -> String {
        use colored::Colorize;
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, _level: LogLevel, line: &str) -> String {
        line.to_string()
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, level: LogLevel, line: &str) -> Result<()> {
        let mut output = self.paint(level, line);
        output.push('\n');
        self.writer
            .write_all(output.as_bytes())
            .map_err(|e| LoggerError::sink_write("console", e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LoggerError::sink_write("console", e))
    }

    fn name(&self) -> &str {
        "console"
    }
}
