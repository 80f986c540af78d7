//! Log entry structure

use super::destination::Destinations;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Numeric thread ids are handed out on first use per thread
thread_local! {
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// Small, stable numeric id of the calling thread.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| {
        if id.get() == 0 {
            id.set(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
        }
        id.get()
    })
}

/// Executable name without extension, resolved once per process.
pub fn process_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();
    NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "unknown".to_string())
    })
}

/// A rendered message plus the routing data and call-site metadata the
/// worker needs. Built on the producer thread, consumed by the worker.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub mask: u32,
    pub destinations: Destinations,
    pub message: String,
    pub function: Option<String>,
    /// `false` for entries from the undecorated entry point.
    pub decorate: bool,
    pub timestamp: DateTime<Utc>,
    pub process_id: u32,
    pub thread_id: u64,
}

impl LogEntry {
    pub fn new(level: LogLevel, mask: u32, destinations: Destinations, message: String) -> Self {
        Self {
            level,
            mask,
            destinations,
            message,
            function: None,
            decorate: true,
            timestamp: Utc::now(),
            process_id: std::process::id(),
            thread_id: current_thread_id(),
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        let function = function.into();
        self.function = (!function.is_empty()).then_some(function);
        self
    }

    pub fn without_decoration(mut self) -> Self {
        self.decorate = false;
        self
    }
}
