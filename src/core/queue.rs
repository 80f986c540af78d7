//! Multi-producer, single-consumer message queue
//!
//! Wraps a `crossbeam-channel` pair with an open/closed gate. Producers push
//! under a shared read lock; [`LogQueue::close`] takes the write lock, flips the
//! gate and pushes the shutdown marker, so every accepted entry is ordered
//! before the marker and gets drained by the worker.
//!
//! Overflow alerts and the user callback run after the read lock is released.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use super::overflow_policy::{OverflowCallback, OverflowPolicy};
use crossbeam_channel::{bounded, unbounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Item carried by the queue.
#[derive(Debug)]
pub enum QueueItem {
    Record(LogEntry),
    /// Flush barrier: the worker acknowledges once everything before it is written.
    Flush(Sender<()>),
    /// Poison marker: the worker exits after seeing it.
    Shutdown,
}

/// What happened to a pushed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queue closed; the logger is not running.
    Rejected,
    /// Bounded queue full and the policy dropped the entry.
    Dropped,
}

pub struct LogQueue {
    sender: Sender<QueueItem>,
    receiver: Receiver<QueueItem>,
    closed: RwLock<bool>,
    capacity: Option<usize>,
    policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
}

impl LogQueue {
    /// Unbounded queue, created closed.
    pub fn unbounded(metrics: Arc<LoggerMetrics>) -> Self {
        let (sender, receiver) = unbounded();
        Self::from_parts(sender, receiver, None, OverflowPolicy::Block, None, metrics)
    }

    /// Bounded queue with an overflow policy, created closed.
    ///
    /// At most `capacity` items are buffered. Flush and shutdown items wait
    /// for room the same way a `Block` producer does; the worker keeps
    /// draining for as long as the queue is open.
    pub fn bounded(
        capacity: usize,
        policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config("queue", "capacity must be non-zero"));
        }
        let (sender, receiver) = bounded(capacity);
        Ok(Self::from_parts(
            sender,
            receiver,
            Some(capacity),
            policy,
            on_overflow,
            metrics,
        ))
    }

    fn from_parts(
        sender: Sender<QueueItem>,
        receiver: Receiver<QueueItem>,
        capacity: Option<usize>,
        policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sender,
            receiver,
            closed: RwLock::new(true),
            capacity,
            policy,
            on_overflow,
            metrics,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn is_open(&self) -> bool {
        !*self.closed.read()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Start accepting pushes.
    pub fn open(&self) {
        *self.closed.write() = false;
    }

    /// Stop accepting pushes and enqueue the shutdown marker behind every
    /// accepted entry. Returns `false` if the queue was already closed.
    pub fn close(&self) -> bool {
        let mut closed = self.closed.write();
        if *closed {
            return false;
        }
        *closed = true;
        // The receiver lives in self, so this only waits for the worker to make room.
        let _ = self.sender.send(QueueItem::Shutdown);
        true
    }

    /// Enqueue an entry. Never reports an error to the producer.
    pub fn push(&self, entry: LogEntry) -> PushOutcome {
        let (outcome, alert) = {
            let closed = self.closed.read();
            if *closed {
                self.metrics.record_rejected();
                return PushOutcome::Rejected;
            }

            let sent = match self.capacity {
                None => (self.send_blocking(entry), None),
                Some(_) => self.send_bounded(entry),
            };
            if sent.0 == PushOutcome::Queued {
                self.metrics.record_enqueued();
            }
            sent
        };

        // Gate released: the callback may log through this queue or stop it.
        if let Some(dropped) = alert {
            self.alert(dropped);
        }
        outcome
    }

    /// Block until the worker has written everything pushed before this call.
    pub fn flush_barrier(&self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        {
            let closed = self.closed.read();
            if *closed {
                return Err(LoggerError::LoggerStopped);
            }
            self.sender
                .send(QueueItem::Flush(ack_tx))
                .map_err(|_| LoggerError::LoggerStopped)?;
        }
        ack_rx.recv().map_err(|_| LoggerError::LoggerStopped)
    }

    /// Block until an item is available.
    pub fn pop(&self) -> QueueItem {
        self.receiver.recv().unwrap_or(QueueItem::Shutdown)
    }

    /// Non-blocking pop; `None` when the queue is empty.
    pub fn try_pop(&self) -> Option<QueueItem> {
        self.receiver.try_recv().ok()
    }

    fn send_blocking(&self, entry: LogEntry) -> PushOutcome {
        match self.sender.send(QueueItem::Record(entry)) {
            Ok(()) => PushOutcome::Queued,
            Err(_) => PushOutcome::Rejected,
        }
    }

    /// Returns the outcome and, when an alert is due, the running drop count.
    fn send_bounded(&self, entry: LogEntry) -> (PushOutcome, Option<u64>) {
        match self.sender.try_send(QueueItem::Record(entry)) {
            Ok(()) => (PushOutcome::Queued, None),
            Err(TrySendError::Full(QueueItem::Record(entry))) => self.handle_overflow(entry),
            Err(_) => (PushOutcome::Rejected, None),
        }
    }

    fn handle_overflow(&self, entry: LogEntry) -> (PushOutcome, Option<u64>) {
        self.metrics.record_queue_full();

        match &self.policy {
            OverflowPolicy::Block => {
                self.metrics.record_block();
                (self.send_blocking(entry), None)
            }
            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match self.sender.send_timeout(QueueItem::Record(entry), *timeout) {
                    Ok(()) => (PushOutcome::Queued, None),
                    Err(SendTimeoutError::Timeout(_)) => (PushOutcome::Dropped, self.record_drop()),
                    Err(SendTimeoutError::Disconnected(_)) => (PushOutcome::Rejected, None),
                }
            }
            OverflowPolicy::DropNewest => {
                self.metrics.record_overflow_dropped();
                (PushOutcome::Dropped, None)
            }
            OverflowPolicy::AlertAndDrop => (PushOutcome::Dropped, self.record_drop()),
        }
    }

    /// Count one drop; `Some(total)` on the first drop and every thousandth after.
    fn record_drop(&self) -> Option<u64> {
        let dropped = self.metrics.record_overflow_dropped() + 1;
        (dropped == 1 || dropped.is_multiple_of(1000)).then_some(dropped)
    }

    fn alert(&self, dropped: u64) {
        eprintln!(
            "[LOGGER WARNING] Queue full, {} logs dropped. \
             Consider increasing capacity or using the Block policy.",
            dropped
        );
        if let Some(ref callback) = self.on_overflow {
            callback(dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Destinations, LogLevel};
    use std::time::Duration;

    fn entry(text: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, 1, Destinations::FILE, text.to_string())
    }

    fn text_of(item: QueueItem) -> String {
        match item {
            QueueItem::Record(entry) => entry.message,
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_closed_queue_rejects() {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = LogQueue::unbounded(Arc::clone(&metrics));
        assert_eq!(queue.push(entry("early")), PushOutcome::Rejected);
        assert_eq!(metrics.rejected(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_and_shutdown_marker_last() {
        let queue = LogQueue::unbounded(Arc::new(LoggerMetrics::new()));
        queue.open();
        for i in 0..3 {
            assert_eq!(queue.push(entry(&format!("m{}", i))), PushOutcome::Queued);
        }
        assert!(queue.close());
        assert!(!queue.close());
        assert_eq!(queue.push(entry("late")), PushOutcome::Rejected);

        assert_eq!(text_of(queue.pop()), "m0");
        assert_eq!(text_of(queue.pop()), "m1");
        assert_eq!(text_of(queue.pop()), "m2");
        assert!(matches!(queue.pop(), QueueItem::Shutdown));
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LogQueue::bounded(0, OverflowPolicy::Block, None, Arc::default());
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_drop_newest_when_full() {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue =
            LogQueue::bounded(2, OverflowPolicy::DropNewest, None, Arc::clone(&metrics)).unwrap();
        queue.open();

        assert_eq!(queue.push(entry("a")), PushOutcome::Queued);
        assert_eq!(queue.push(entry("b")), PushOutcome::Queued);
        assert_eq!(queue.push(entry("c")), PushOutcome::Dropped);
        assert_eq!(metrics.overflow_dropped(), 1);
        assert_eq!(metrics.queue_full_events(), 1);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_alert_and_drop_invokes_callback() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = Arc::clone(&seen);
        let queue = LogQueue::bounded(
            1,
            OverflowPolicy::AlertAndDrop,
            Some(Arc::new(move |count| seen_clone.store(count, Ordering::SeqCst))),
            Arc::default(),
        )
        .unwrap();
        queue.open();

        queue.push(entry("a"));
        assert_eq!(queue.push(entry("b")), PushOutcome::Dropped);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_block_with_timeout_drops_after_wait() {
        let queue = LogQueue::bounded(
            1,
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(20)),
            None,
            Arc::default(),
        )
        .unwrap();
        queue.open();

        assert_eq!(queue.push(entry("a")), PushOutcome::Queued);
        assert_eq!(queue.push(entry("b")), PushOutcome::Dropped);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_bounded_queue_holds_capacity_items() {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue =
            LogQueue::bounded(3, OverflowPolicy::DropNewest, None, Arc::clone(&metrics)).unwrap();
        queue.open();

        for i in 0..5 {
            queue.push(entry(&i.to_string()));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(metrics.enqueued(), 3);
        assert_eq!(metrics.overflow_dropped(), 2);
    }

    #[test]
    fn test_close_waits_for_room_on_full_queue() {
        let queue = Arc::new(
            LogQueue::bounded(1, OverflowPolicy::DropNewest, None, Arc::default()).unwrap(),
        );
        queue.open();
        queue.push(entry("a"));

        let consumer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                let first = text_of(queue.pop());
                assert!(matches!(queue.pop(), QueueItem::Shutdown));
                first
            })
        };

        assert!(queue.close());
        assert_eq!(consumer.join().unwrap(), "a");
    }

    #[test]
    fn test_overflow_callback_may_reenter_queue() {
        use std::sync::{OnceLock, Weak};

        // The callback stands in for a worker making room, then stops the queue
        // and pushes again. Stopping needs the gate's write lock, so this only
        // returns if the callback runs after the producer's read lock is released.
        let slot: Arc<OnceLock<Weak<LogQueue>>> = Arc::new(OnceLock::new());
        let callback_slot = Arc::clone(&slot);
        let outcomes = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let callback_outcomes = Arc::clone(&outcomes);

        let queue = Arc::new(
            LogQueue::bounded(
                1,
                OverflowPolicy::AlertAndDrop,
                Some(Arc::new(move |dropped: u64| {
                    if let Some(queue) = callback_slot.get().and_then(Weak::upgrade) {
                        let drained = queue.try_pop().map(text_of);
                        let closed = queue.close();
                        let pushed = queue.push(entry("from callback"));
                        callback_outcomes.lock().push((dropped, drained, closed, pushed));
                    }
                })),
                Arc::default(),
            )
            .unwrap(),
        );
        let _ = slot.set(Arc::downgrade(&queue));
        queue.open();

        assert_eq!(queue.push(entry("a")), PushOutcome::Queued);
        assert_eq!(queue.push(entry("b")), PushOutcome::Dropped);

        assert_eq!(
            *outcomes.lock(),
            vec![(1, Some("a".to_string()), true, PushOutcome::Rejected)]
        );
        assert!(!queue.is_open());
        assert!(matches!(queue.pop(), QueueItem::Shutdown));
    }
}
