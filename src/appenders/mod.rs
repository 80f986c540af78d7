//! Appender implementations

pub mod console;
pub mod debugger;
pub mod file;
pub mod memory;

pub use console::ConsoleAppender;
pub use debugger::DebuggerAppender;
pub use file::FileAppender;
pub use memory::MemoryWriter;

pub use crate::core::Appender;
