//! # Serial Logger
//!
//! An in-process logging facility. Callers tag each message with a severity,
//! a routing mask and a set of destinations (file, debugger trace, console);
//! a single background worker performs every write, so concurrent callers
//! never interleave output or race on the file handle.
//!
//! ## Features
//!
//! - **Non-blocking writes**: callers render and enqueue, the worker does the I/O
//! - **Runtime filtering**: minimum level and routing mask, changeable from any thread
//! - **Flush barrier**: `stop()` and `flush()` return only after queued messages are written
//! - **Write-time decoration**: process name, pid/tid and function name prefixes

pub mod appenders;
#[cfg(feature = "log-bridge")]
pub mod bridge;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, DebuggerAppender, FileAppender, MemoryWriter};
    pub use crate::core::{
        Appender, Destinations, FormatOptions, LogEntry, LogLevel, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, OverflowCallback, OverflowPolicy, Result, TimestampFormat,
        WorkerState, MASK_ALL, MASK_SYS,
    };
}

pub use appenders::{ConsoleAppender, DebuggerAppender, FileAppender, MemoryWriter};
pub use core::{
    Appender, Destinations, FormatOptions, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, OverflowCallback, OverflowPolicy, Result, TimestampFormat, WorkerState,
    MASK_ALL, MASK_SYS,
};
