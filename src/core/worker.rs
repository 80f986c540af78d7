//! Background worker: the single consumer of the log queue
//!
//! The worker owns every sink while it runs, so the file handle is only
//! ever touched from this thread. It returns the sinks when it exits.
//!
//! Sinks may buffer, so an entry only counts as written once every sink it
//! reached has flushed without error.

use super::appender::Appender;
use super::decoration::FormatOptions;
use super::destination::Destinations;
use super::filter::FilterState;
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use super::queue::{LogQueue, QueueItem};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

/// Lifecycle of the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Running,
    Stopping,
}

impl WorkerState {
    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Stopped => 0,
            WorkerState::Running => 1,
            WorkerState::Stopping => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::Running,
            2 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Stopped => write!(f, "Stopped"),
            WorkerState::Running => write!(f, "Running"),
            WorkerState::Stopping => write!(f, "Stopping"),
        }
    }
}

/// Lock-free cell holding a [`WorkerState`], readable while a transition is in progress.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: WorkerState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    pub(crate) fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: WorkerState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }
}

/// An appender bound to the destination flag that selects it.
pub struct Sink {
    pub destination: Destinations,
    pub appender: Box<dyn Appender>,
}

impl Sink {
    pub fn new(destination: Destinations, appender: impl Appender + 'static) -> Self {
        Self {
            destination,
            appender: Box::new(appender),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("destination", &self.destination)
            .field("appender", &self.appender.name())
            .finish()
    }
}

pub(crate) struct Worker {
    queue: Arc<LogQueue>,
    filter: Arc<FilterState>,
    format: Arc<RwLock<FormatOptions>>,
    metrics: Arc<LoggerMetrics>,
    sinks: Vec<Sink>,
    /// Entries appended since the last flush, indexed by destination bits.
    pending: [u64; 8],
}

impl Worker {
    pub(crate) fn new(
        queue: Arc<LogQueue>,
        filter: Arc<FilterState>,
        format: Arc<RwLock<FormatOptions>>,
        metrics: Arc<LoggerMetrics>,
        sinks: Vec<Sink>,
    ) -> Self {
        Self {
            queue,
            filter,
            format,
            metrics,
            sinks,
            pending: [0; 8],
        }
    }

    /// Spawn the consumer thread. On failure the sinks are handed back.
    pub(crate) fn spawn(
        self,
        thread_name: &str,
    ) -> std::result::Result<thread::JoinHandle<Vec<Sink>>, (io::Error, Vec<Sink>)> {
        // Keep a way back to the sinks if the OS refuses the thread.
        let slot = Arc::new(parking_lot::Mutex::new(Some(self)));
        let worker_slot = Arc::clone(&slot);

        let spawned = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                let worker = worker_slot.lock().take();
                worker.map(Worker::run).unwrap_or_default()
            });

        match spawned {
            Ok(handle) => Ok(handle),
            Err(e) => {
                let sinks = slot.lock().take().map(|w| w.sinks).unwrap_or_default();
                Err((e, sinks))
            }
        }
    }

    /// Consume until the shutdown marker, then flush and return the sinks.
    pub(crate) fn run(mut self) -> Vec<Sink> {
        loop {
            match self.queue.pop() {
                QueueItem::Record(entry) => {
                    self.process(&entry);
                    if self.queue.is_empty() {
                        self.flush_sinks();
                    }
                }
                QueueItem::Flush(ack) => {
                    self.flush_sinks();
                    let _ = ack.send(());
                }
                QueueItem::Shutdown => break,
            }
        }

        self.flush_sinks();
        self.sinks
    }

    /// Filter one entry and fan it out to each requested sink.
    fn process(&mut self, entry: &LogEntry) {
        if !self.filter.passes(entry) {
            self.metrics.record_filtered();
            return;
        }

        // Options lock is released before any I/O.
        let line = self.format.read().decorate(entry);

        let mut failed = false;
        for sink in self
            .sinks
            .iter_mut()
            .filter(|sink| entry.destinations.contains(sink.destination))
        {
            let result = catch_unwind(AssertUnwindSafe(|| sink.appender.append(entry.level, &line)));
            let ok = match result {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.appender.name(), e);
                    false
                }
                Err(panic) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                         Other sinks continue to function.",
                        sink.appender.name(),
                        panic_message(panic.as_ref())
                    );
                    false
                }
            };
            if !ok {
                self.metrics.record_sink_failure();
                failed = true;
            }
        }

        if !failed {
            self.pending[usize::from(entry.destinations.bits())] += 1;
        }
    }

    fn flush_sinks(&mut self) {
        let mut failed = Destinations::NONE;
        for sink in self.sinks.iter_mut() {
            let ok = match catch_unwind(AssertUnwindSafe(|| sink.appender.flush())) {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", sink.appender.name(), e);
                    false
                }
                Err(panic) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Sink '{}' panicked during flush: {}",
                        sink.appender.name(),
                        panic_message(panic.as_ref())
                    );
                    false
                }
            };
            if !ok {
                self.metrics.record_sink_failure();
                failed |= sink.destination;
            }
        }
        self.settle_pending(failed);
    }

    /// Count buffered entries as written unless they went to a sink whose flush failed.
    fn settle_pending(&mut self, failed: Destinations) {
        for (bits, count) in self.pending.iter_mut().enumerate() {
            if *count == 0 {
                continue;
            }
            let destinations = Destinations::from_bits_truncate(bits as u8);
            if !destinations.intersects(failed) {
                self.metrics.record_written_many(*count);
            }
            *count = 0;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::{ConsoleAppender, MemoryWriter};
    use crate::core::{LogLevel, LoggerError, Result, MASK_ALL};

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _level: LogLevel, _line: &str) -> Result<()> {
            Err(LoggerError::sink_write("failing", io::Error::other("disk full")))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _level: LogLevel, _line: &str) -> Result<()> {
            panic!("sink exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    /// Accepts every line into a buffer, then fails when asked to flush it.
    struct BufferedFailingAppender;

    impl Appender for BufferedFailingAppender {
        fn append(&mut self, _level: LogLevel, _line: &str) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Err(LoggerError::sink_write(
                "buffered",
                io::Error::other("no space left on device"),
            ))
        }

        fn name(&self) -> &str {
            "buffered"
        }
    }

    fn harness(sinks: Vec<Sink>) -> (Arc<LogQueue>, Arc<LoggerMetrics>, Worker) {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = Arc::new(LogQueue::unbounded(Arc::clone(&metrics)));
        queue.open();
        let worker = Worker::new(
            Arc::clone(&queue),
            Arc::new(FilterState::new(LogLevel::Debug, MASK_ALL)),
            Arc::new(RwLock::new(FormatOptions::plain())),
            Arc::clone(&metrics),
            sinks,
        );
        (queue, metrics, worker)
    }

    fn entry(text: &str, destinations: Destinations) -> LogEntry {
        LogEntry::new(LogLevel::Info, 1, destinations, text.to_string())
    }

    #[test]
    fn test_state_cell_roundtrip() {
        let cell = StateCell::new(WorkerState::Stopped);
        for state in [WorkerState::Running, WorkerState::Stopping, WorkerState::Stopped] {
            cell.set(state);
            assert_eq!(cell.get(), state);
        }
    }

    #[test]
    fn test_routes_by_destination() {
        let file = MemoryWriter::new();
        let console = MemoryWriter::new();
        let (queue, metrics, worker) = harness(vec![
            Sink::new(Destinations::FILE, ConsoleAppender::with_writer(file.clone())),
            Sink::new(Destinations::CONSOLE, ConsoleAppender::with_writer(console.clone())),
        ]);

        queue.push(entry("both", Destinations::FILE | Destinations::CONSOLE));
        queue.push(entry("file only", Destinations::FILE));
        queue.push(entry("debugger only", Destinations::DEBUGGER));
        queue.close();

        let sinks = worker.run();
        assert_eq!(sinks.len(), 2);
        assert_eq!(file.lines(), vec!["both", "file only"]);
        assert_eq!(console.lines(), vec!["both"]);
        assert_eq!(metrics.written(), 3);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let console = MemoryWriter::new();
        let (queue, metrics, worker) = harness(vec![
            Sink::new(Destinations::FILE, FailingAppender),
            Sink::new(Destinations::DEBUGGER, PanickingAppender),
            Sink::new(Destinations::CONSOLE, ConsoleAppender::with_writer(console.clone())),
        ]);

        for i in 0..3 {
            queue.push(entry(&format!("msg {}", i), Destinations::ALL));
        }
        queue.close();
        worker.run();

        assert_eq!(console.lines(), vec!["msg 0", "msg 1", "msg 2"]);
        assert_eq!(metrics.sink_failures(), 6);
        assert_eq!(metrics.written(), 0);
    }

    #[test]
    fn test_flush_failure_is_a_sink_failure() {
        let console = MemoryWriter::new();
        let (queue, metrics, worker) = harness(vec![
            Sink::new(Destinations::FILE, BufferedFailingAppender),
            Sink::new(Destinations::CONSOLE, ConsoleAppender::with_writer(console.clone())),
        ]);

        queue.push(entry("to both", Destinations::FILE | Destinations::CONSOLE));
        queue.push(entry("file only", Destinations::FILE));
        queue.push(entry("console only", Destinations::CONSOLE));
        queue.close();
        worker.run();

        // Everything was queued before the run, so only the final flush happens.
        assert_eq!(console.lines(), vec!["to both", "console only"]);
        assert_eq!(metrics.sink_failures(), 1);
        assert_eq!(metrics.written(), 1);
    }

    #[test]
    fn test_flush_item_is_acknowledged() {
        let (queue, _metrics, worker) = harness(Vec::new());
        let handle = std::thread::spawn(move || worker.run());

        queue.flush_barrier().unwrap();
        queue.close();
        handle.join().unwrap();
    }
}
