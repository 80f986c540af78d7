//! Runtime level and routing-mask filter
//!
//! Both fields are plain atomics: any thread may change them while the
//! worker is running, and the worker reads them once per dequeued entry.
//! A read always observes a value some writer stored.

use super::destination::MASK_ALL;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

#[derive(Debug)]
pub struct FilterState {
    min_level: AtomicU8,
    enabled_mask: AtomicU32,
}

impl FilterState {
    pub const fn new(min_level: LogLevel, enabled_mask: u32) -> Self {
        Self {
            min_level: AtomicU8::new(min_level.as_u8()),
            enabled_mask: AtomicU32::new(enabled_mask),
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_level(&self, level: LogLevel) {
        self.min_level.store(level.as_u8(), Ordering::Release);
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.enabled_mask.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_mask(&self, mask: u32) {
        self.enabled_mask.store(mask, Ordering::Release);
    }

    /// Level check first, then the routing mask.
    pub fn passes(&self, entry: &LogEntry) -> bool {
        if entry.level < self.level() {
            return false;
        }
        entry.mask & self.mask() != 0
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(LogLevel::Info, MASK_ALL)
    }
}
