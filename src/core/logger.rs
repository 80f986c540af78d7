//! Logger facade: renders call-site arguments, enqueues them, and owns the
//! worker lifecycle

use super::{
    decoration::FormatOptions,
    destination::{Destinations, MASK_ALL, MASK_SYS},
    error::{LoggerError, Result},
    filter::FilterState,
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    queue::{LogQueue, PushOutcome},
    worker::{Sink, StateCell, Worker, WorkerState},
};
use crate::appenders::{ConsoleAppender, DebuggerAppender, FileAppender};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Default name of the worker thread.
pub const DEFAULT_WORKER_NAME: &str = "serial-logger";

/// State guarded by the lifecycle lock: the worker handle, and the
/// console/debugger sinks while no worker owns them.
struct Lifecycle {
    handle: Option<JoinHandle<Vec<Sink>>>,
    idle_sinks: Vec<Sink>,
}

/// A logger instance: one queue, one worker thread, one optional log file.
///
/// All methods take `&self`, so a logger can be shared across threads behind
/// an `Arc`. Dropping the logger performs [`Logger::stop`].
///
/// # Example
///
/// ```no_run
/// use serial_logger::prelude::*;
///
/// let logger = Logger::new();
/// logger.start(LogLevel::Info, Some("app.log")).unwrap();
/// logger.write(
///     MASK_SYS,
///     LogLevel::Info,
///     Destinations::FILE | Destinations::CONSOLE,
///     "main",
///     format_args!("listening on port {}", 8080),
/// );
/// logger.stop();
/// ```
///
/// Messages written concurrently with `stop()` are either fully written or
/// rejected (counted in [`LoggerMetrics::rejected`]); none is lost after
/// being accepted.
pub struct Logger {
    filter: Arc<FilterState>,
    format: Arc<RwLock<FormatOptions>>,
    queue: Arc<LogQueue>,
    metrics: Arc<LoggerMetrics>,
    state: StateCell,
    lifecycle: Mutex<Lifecycle>,
    worker_name: String,
    lock_file: bool,
}

impl Logger {
    /// Unbounded queue, stdout console, platform debugger stream, full decoration.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Open the log file (if a path is given), set the level filter and
    /// spawn the worker.
    ///
    /// Fails with [`LoggerError::AlreadyRunning`] on a double start, or with
    /// [`LoggerError::FileOpen`]/[`LoggerError::FileLocked`] if the file
    /// cannot be opened for append. Nothing is retried.
    pub fn start<P: AsRef<Path>>(&self, min_level: LogLevel, log_file_path: Option<P>) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if self.state.get() != WorkerState::Stopped {
            return Err(LoggerError::AlreadyRunning);
        }

        let file = log_file_path
            .map(|path| FileAppender::open(path, self.lock_file))
            .transpose()?;

        self.filter.set_level(min_level);

        let mut sinks = Vec::with_capacity(3);
        if let Some(file) = file {
            sinks.push(Sink::new(Destinations::FILE, file));
        }
        sinks.append(&mut lifecycle.idle_sinks);

        let worker = Worker::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.filter),
            Arc::clone(&self.format),
            Arc::clone(&self.metrics),
            sinks,
        );

        match worker.spawn(&self.worker_name) {
            Ok(handle) => {
                lifecycle.handle = Some(handle);
                self.queue.open();
                self.state.set(WorkerState::Running);
                Ok(())
            }
            Err((e, sinks)) => {
                lifecycle.idle_sinks = Self::retain_idle(sinks);
                Err(LoggerError::ThreadSpawn(e))
            }
        }
    }

    /// Drain everything accepted so far, join the worker and close the file.
    /// A no-op when already stopped.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if self.state.get() == WorkerState::Stopped {
            return;
        }
        self.state.set(WorkerState::Stopping);

        self.queue.close();

        if let Some(handle) = lifecycle.handle.take() {
            match handle.join() {
                Ok(sinks) => lifecycle.idle_sinks = Self::retain_idle(sinks),
                Err(e) => {
                    eprintln!("[LOGGER ERROR] Worker thread panicked during shutdown: {:?}", e);
                    lifecycle.idle_sinks = default_sinks();
                }
            }
        }

        self.state.set(WorkerState::Stopped);
    }

    /// Block until every message written before this call has reached its sinks.
    pub fn flush(&self) -> Result<()> {
        self.queue.flush_barrier()
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == WorkerState::Running
    }

    /// Toggle the three prefix parts; level and timestamp settings are kept.
    pub fn set_format(&self, show_process_name: bool, show_pid_tid: bool, show_function_name: bool) {
        let mut format = self.format.write();
        format.show_process_name = show_process_name;
        format.show_pid_tid = show_pid_tid;
        format.show_function_name = show_function_name;
    }

    pub fn set_format_options(&self, options: FormatOptions) {
        *self.format.write() = options;
    }

    pub fn format_options(&self) -> FormatOptions {
        self.format.read().clone()
    }

    /// Applies to every entry dequeued after the call, including ones already queued.
    pub fn set_level_filter(&self, min_level: LogLevel) {
        self.filter.set_level(min_level);
    }

    pub fn level_filter(&self) -> LogLevel {
        self.filter.level()
    }

    pub fn set_mask_filter(&self, mask: u32) {
        self.filter.set_mask(mask);
    }

    pub fn mask_filter(&self) -> u32 {
        self.filter.mask()
    }

    /// Render and enqueue one message. Never blocks on I/O and never fails
    /// the caller; filtering happens on the worker.
    pub fn write(
        &self,
        mask: u32,
        level: LogLevel,
        destinations: Destinations,
        origin_function: &str,
        args: fmt::Arguments<'_>,
    ) {
        if destinations.is_empty() {
            return;
        }
        let entry = LogEntry::new(level, mask, destinations, render(args))
            .with_function(origin_function);
        self.enqueue(entry);
    }

    /// Like [`Logger::write`], but the line is never decorated.
    pub fn write_without_deco(
        &self,
        mask: u32,
        level: LogLevel,
        destinations: Destinations,
        args: fmt::Arguments<'_>,
    ) {
        if destinations.is_empty() {
            return;
        }
        let entry = LogEntry::new(level, mask, destinations, render(args)).without_decoration();
        self.enqueue(entry);
    }

    /// Enqueue a pre-built entry.
    pub fn enqueue(&self, entry: LogEntry) -> PushOutcome {
        self.queue.push(entry)
    }

    fn write_message(&self, level: LogLevel, destinations: Destinations, message: String) {
        self.enqueue(LogEntry::new(level, MASK_SYS, destinations, message));
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Debug, Destinations::ALL, message.into());
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Info, Destinations::ALL, message.into());
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Warn, Destinations::ALL, message.into());
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.write_message(LogLevel::ERROR, Destinations::ALL, message.into());
    }

    #[inline]
    pub fn con_debug(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Debug, Destinations::CONSOLE, message.into());
    }

    #[inline]
    pub fn con_info(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Info, Destinations::CONSOLE, message.into());
    }

    #[inline]
    pub fn con_warn(&self, message: impl Into<String>) {
        self.write_message(LogLevel::Warn, Destinations::CONSOLE, message.into());
    }

    #[inline]
    pub fn con_error(&self, message: impl Into<String>) {
        self.write_message(LogLevel::ERROR, Destinations::CONSOLE, message.into());
    }

    /// Counters for queued, written, filtered, rejected and failed messages.
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    fn retain_idle(sinks: Vec<Sink>) -> Vec<Sink> {
        // Dropping the file sink closes the file.
        sinks
            .into_iter()
            .filter(|sink| sink.destination != Destinations::FILE)
            .collect()
    }
}

fn render(args: fmt::Arguments<'_>) -> String {
    match args.as_str() {
        Some(s) => s.to_owned(),
        None => fmt::format(args),
    }
}

fn default_sinks() -> Vec<Sink> {
    vec![
        Sink::new(Destinations::DEBUGGER, DebuggerAppender::new()),
        Sink::new(Destinations::CONSOLE, ConsoleAppender::new()),
    ]
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();

        let rejected = self.metrics.rejected();
        let dropped = self.metrics.overflow_dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shut down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
        if rejected > 0 {
            eprintln!(
                "[LOGGER WARNING] {} logs were written while the logger was not running",
                rejected
            );
        }
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use serial_logger::prelude::*;
/// use std::sync::Arc;
///
/// let capture = MemoryWriter::new();
/// let logger = Logger::builder()
///     .format(FormatOptions::plain())
///     .mask(MASK_SYS)
///     .console_writer(capture.clone())
///     .queue_capacity(1000)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .build();
///
/// logger.start(LogLevel::Debug, None::<&str>).unwrap();
/// logger.con_info("ready");
/// logger.stop();
/// assert_eq!(capture.lines(), vec!["ready"]);
/// ```
pub struct LoggerBuilder {
    format: FormatOptions,
    mask: u32,
    capacity: Option<usize>,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    console: Option<ConsoleAppender>,
    debugger: Option<DebuggerAppender>,
    console_colors: bool,
    lock_file: bool,
    worker_name: String,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            format: FormatOptions::new(true, true, true),
            mask: MASK_ALL,
            capacity: None,
            overflow_policy: OverflowPolicy::Block,
            on_overflow: None,
            console: None,
            debugger: None,
            console_colors: false,
            lock_file: false,
            worker_name: DEFAULT_WORKER_NAME.to_string(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Initial routing mask; defaults to [`MASK_ALL`].
    #[must_use = "builder methods return a new value"]
    pub fn mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    /// Bound the queue. Without this the queue is unbounded.
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// What producers do when a bounded queue is full. Default is `Block`.
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Send console output to `writer` instead of stdout.
    #[must_use = "builder methods return a new value"]
    pub fn console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(ConsoleAppender::with_writer(writer));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    /// Send debugger trace output to `writer` instead of the platform stream.
    #[must_use = "builder methods return a new value"]
    pub fn debugger_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.debugger = Some(DebuggerAppender::with_writer(writer));
        self
    }

    /// Take an exclusive lock on the log file at `start`.
    #[must_use = "builder methods return a new value"]
    pub fn exclusive_file_lock(mut self, enabled: bool) -> Self {
        self.lock_file = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Build the logger, validating the queue configuration.
    pub fn try_build(self) -> Result<Logger> {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = match self.capacity {
            Some(capacity) => LogQueue::bounded(
                capacity,
                self.overflow_policy,
                self.on_overflow,
                Arc::clone(&metrics),
            )?,
            None => LogQueue::unbounded(Arc::clone(&metrics)),
        };

        let console = self
            .console
            .unwrap_or_default()
            .with_colors(self.console_colors);
        let debugger = self.debugger.unwrap_or_default();

        Ok(Logger {
            filter: Arc::new(FilterState::new(LogLevel::Info, self.mask)),
            format: Arc::new(RwLock::new(self.format)),
            queue: Arc::new(queue),
            metrics,
            state: StateCell::new(WorkerState::Stopped),
            lifecycle: Mutex::new(Lifecycle {
                handle: None,
                idle_sinks: vec![
                    Sink::new(Destinations::DEBUGGER, debugger),
                    Sink::new(Destinations::CONSOLE, console),
                ],
            }),
            worker_name: self.worker_name,
            lock_file: self.lock_file,
        })
    }

    /// Build the logger.
    ///
    /// # Panics
    ///
    /// Panics if a zero queue capacity was configured; use
    /// [`LoggerBuilder::try_build`] to handle that as an error.
    pub fn build(self) -> Logger {
        match self.try_build() {
            Ok(logger) => logger,
            Err(e) => panic!("invalid logger configuration: {}", e),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
