//! Write-time decoration of log lines
//!
//! The worker builds a prefix from the current [`FormatOptions`] when an
//! entry is written, so toggling options never requires re-rendering queued
//! entries. Decoration only prepends; the caller's text is copied as is.

use super::log_entry::{process_name, LogEntry};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Timestamp style used when [`FormatOptions::timestamp`] is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,
    /// Local wall clock: `2025-01-08 19:30:45.123`
    Local,
    /// `1736332245123`
    UnixMillis,
    /// Any strftime-compatible pattern, rendered in UTC.
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Local => datetime
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }
}

/// Prefix options. All off yields the bare text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub show_process_name: bool,
    pub show_pid_tid: bool,
    pub show_function_name: bool,
    #[serde(default)]
    pub show_level: bool,
    #[serde(default)]
    pub timestamp: Option<TimestampFormat>,
}

impl FormatOptions {
    /// Process name, pid/tid and function name on; level and timestamp off.
    pub fn new(show_process_name: bool, show_pid_tid: bool, show_function_name: bool) -> Self {
        Self {
            show_process_name,
            show_pid_tid,
            show_function_name,
            show_level: false,
            timestamp: None,
        }
    }

    /// No prefix at all.
    pub fn plain() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level(mut self, show_level: bool) -> Self {
        self.show_level = show_level;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, format: TimestampFormat) -> Self {
        self.timestamp = Some(format);
        self
    }

    fn is_plain(&self) -> bool {
        !self.show_process_name
            && !self.show_pid_tid
            && !self.show_function_name
            && !self.show_level
            && self.timestamp.is_none()
    }

    /// Render the full line for `entry`, without the line terminator.
    ///
    /// Layout: `[ts] [LEVEL] name(pid:tid) function : text`, each part
    /// present only when enabled.
    pub fn decorate(&self, entry: &LogEntry) -> String {
        if !entry.decorate || self.is_plain() {
            return entry.message.clone();
        }

        let mut line = String::with_capacity(entry.message.len() + 64);

        if let Some(ref format) = self.timestamp {
            let _ = write!(line, "[{}] ", format.format(&entry.timestamp));
        }
        if self.show_level {
            let _ = write!(line, "[{}] ", entry.level);
        }
        if self.show_process_name {
            line.push_str(process_name());
        }
        if self.show_pid_tid {
            let _ = write!(line, "({}:{})", entry.process_id, entry.thread_id);
        }
        if self.show_process_name || self.show_pid_tid {
            line.push(' ');
        }
        if self.show_function_name {
            if let Some(ref function) = entry.function {
                let _ = write!(line, "{} : ", function);
            }
        }

        line.push_str(&entry.message);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Destinations, LogLevel};
    use chrono::TimeZone;

    fn entry(text: &str) -> LogEntry {
        let mut entry = LogEntry::new(LogLevel::Warn, 1, Destinations::FILE, text.to_string())
            .with_function("load_config");
        entry.timestamp = Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        entry.process_id = 4242;
        entry.thread_id = 7;
        entry
    }

    #[test]
    fn test_plain_is_identity() {
        let e = entry("raw text\twith tab");
        assert_eq!(FormatOptions::plain().decorate(&e), "raw text\twith tab");
        assert_eq!(FormatOptions::new(false, false, false).decorate(&e), e.message);
    }

    #[test]
    fn test_pid_tid_and_function() {
        let e = entry("hello");
        let line = FormatOptions::new(false, true, true).decorate(&e);
        assert_eq!(line, "(4242:7) load_config : hello");
    }

    #[test]
    fn test_process_name_prefix() {
        let e = entry("hello");
        let line = FormatOptions::new(true, true, false).decorate(&e);
        assert_eq!(line, format!("{}(4242:7) hello", process_name()));
    }

    #[test]
    fn test_level_and_timestamp() {
        let e = entry("hello");
        let options = FormatOptions::plain()
            .with_level(true)
            .with_timestamp(TimestampFormat::Iso8601);
        assert_eq!(options.decorate(&e), "[2025-01-08T10:30:45.000Z] [WARN] hello");
    }

    #[test]
    fn test_undecorated_entry_skips_prefix() {
        let e = entry("bare").without_decoration();
        assert_eq!(FormatOptions::new(true, true, true).decorate(&e), "bare");
    }

    #[test]
    fn test_missing_function_omits_separator() {
        let mut e = entry("x");
        e.function = None;
        assert_eq!(FormatOptions::new(false, false, true).decorate(&e), "x");
    }

    #[test]
    fn test_text_always_suffix() {
        let e = entry("payload: 100% \n done");
        for options in [
            FormatOptions::new(true, true, true),
            FormatOptions::plain().with_timestamp(TimestampFormat::UnixMillis),
        ] {
            assert!(options.decorate(&e).ends_with(&e.message));
        }
    }

    #[test]
    fn test_custom_timestamp() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&entry("x").timestamp), "2025/01/08 10:30");
    }
}
