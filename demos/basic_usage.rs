//! Basic logger usage example
//!
//! Demonstrates console output, level filtering and the call-site macros.
//!
//! Run with: cargo run --example basic_usage

use serial_logger::prelude::*;
use serial_logger::{con_dbg, con_err, con_info, con_warn};

fn main() -> Result<()> {
    println!("=== Serial Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .format(FormatOptions::new(false, true, true).with_level(true))
        .console_colors(true)
        .build();
    logger.start(LogLevel::Debug, None::<&str>)?;

    println!("1. Logging at different levels:");
    con_dbg!(logger, "This is a debug message");
    con_info!(logger, "This is an info message");
    con_warn!(logger, "This is a warning message");
    con_err!(logger, "This is an error message");
    logger.flush()?;

    println!("\n2. Raising the level filter to WARN:");
    logger.set_level_filter(LogLevel::Warn);
    con_dbg!(logger, "Debug message (hidden)");
    con_info!(logger, "Info message (hidden)");
    con_warn!(logger, "Warning message (visible)");
    logger.flush()?;

    println!("\n3. Turning decoration off:");
    logger.set_format_options(FormatOptions::plain());
    con_err!(logger, "Bare text, no prefix");

    logger.stop();
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
