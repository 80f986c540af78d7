//! Error types for the logger system

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// `start` called while the worker is already running
    #[error("Logger already running")]
    AlreadyRunning,

    /// Log file could not be created or opened for append
    #[error("Failed to open log file '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the exclusive lock on the log file
    #[error("Failed to acquire file lock on '{}'", .path.display())]
    FileLocked { path: PathBuf },

    /// Worker thread could not be spawned
    #[error("Failed to spawn log worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// Operation requires a running logger
    #[error("Logger stopped")]
    LoggerStopped,

    /// A single destination failed to write one line
    #[error("Sink '{sink}' write failed: {source}")]
    SinkWrite {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },
}

impl LoggerError {
    pub fn file_open(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        LoggerError::FileOpen {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn file_locked(path: impl AsRef<Path>) -> Self {
        LoggerError::FileLocked {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn sink_write(sink: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkWrite {
            sink: sink.into(),
            source,
        }
    }

    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Errors `start` can return; everything else is a runtime condition.
    pub fn is_start_error(&self) -> bool {
        matches!(
            self,
            LoggerError::AlreadyRunning
                | LoggerError::FileOpen { .. }
                | LoggerError::FileLocked { .. }
                | LoggerError::ThreadSpawn(_)
                | LoggerError::InvalidConfiguration { .. }
        )
    }
}
