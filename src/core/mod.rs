//! Core logger types and traits

pub mod appender;
pub mod decoration;
pub mod destination;
pub mod error;
pub mod filter;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod queue;
pub mod worker;

pub use appender::Appender;
pub use decoration::{FormatOptions, TimestampFormat};
pub use destination::{Destinations, MASK_ALL, MASK_SYS};
pub use error::{LoggerError, Result};
pub use filter::FilterState;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, DEFAULT_WORKER_NAME};
pub use metrics::LoggerMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use queue::{LogQueue, PushOutcome, QueueItem};
pub use worker::{Sink, WorkerState};
