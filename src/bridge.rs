//! Bridge from the `log` crate facade.
//!
//! Records emitted through `log::info!` and friends are enqueued like any
//! other message, tagged with [`MASK_SYS`] and the target as origin.

use crate::core::{Destinations, LogLevel, Logger, MASK_SYS};
use std::sync::Arc;

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Critical,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

/// `log::Log` adapter over a shared [`Logger`].
pub struct LogBridge {
    logger: Arc<Logger>,
    destinations: Destinations,
}

impl LogBridge {
    /// Forward to every destination.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self::with_destinations(logger, Destinations::ALL)
    }

    pub fn with_destinations(logger: Arc<Logger>, destinations: Destinations) -> Self {
        Self {
            logger,
            destinations,
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        // Early out only; the worker filters again at dequeue time.
        LogLevel::from(metadata.level()) >= self.logger.level_filter()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.logger.write(
            MASK_SYS,
            record.level().into(),
            self.destinations,
            record.target(),
            *record.args(),
        );
    }

    fn flush(&self) {
        let _ = self.logger.flush();
    }
}

/// Install `logger` as the `log` crate's global logger.
///
/// # Errors
///
/// Returns an error if a global logger was already installed.
pub fn try_setup_log_crate(logger: Arc<Logger>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogBridge::new(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
