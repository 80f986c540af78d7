//! File appender implementation

use crate::core::{Appender, LogLevel, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only text file, one line per written entry.
pub struct FileAppender {
    path: PathBuf,
    writer: BufWriter<File>,
    #[cfg_attr(not(feature = "file"), allow(dead_code))]
    locked: bool,
}

impl FileAppender {
    /// Create the file if missing and open it for append.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, false)
    }

    /// Like [`FileAppender::new`], optionally taking an exclusive advisory
    /// lock so a second process cannot share the file.
    pub fn open(path: impl AsRef<Path>, exclusive_lock: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::file_open(&path, e))?;

        if exclusive_lock {
            Self::lock(&file, &path)?;
        }

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            locked: exclusive_lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(feature = "file")]
    fn lock(file: &File, path: &Path) -> Result<()> {
        use fs2::FileExt;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_locked(path))
    }

    #[cfg(not(feature = "file"))]
    fn lock(_file: &File, path: &Path) -> Result<()> {
        Err(LoggerError::config(
            "FileAppender",
            format!(
                "exclusive lock on '{}' requires the `file` feature",
                path.display()
            ),
        ))
    }
}

impl Appender for FileAppender {
    fn append(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|e| LoggerError::sink_write("file", e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LoggerError::sink_write("file", e))
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        let _ = self.flush();
        #[cfg(feature = "file")]
        if self.locked {
            use fs2::FileExt;
            let _ = self.writer.get_ref().unlock();
        }
    }
}
