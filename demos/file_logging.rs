//! File logging example
//!
//! Demonstrates file + console destinations and routing masks.
//!
//! Run with: cargo run --example file_logging

use serial_logger::prelude::*;
use serial_logger::{log_info, log_msg, log_warn, log_write};

const MASK_NET: u32 = 0x2;
const MASK_DB: u32 = 0x4;

fn main() -> Result<()> {
    println!("=== Serial Logger - File Logging Example ===\n");

    let logger = Logger::new();
    logger.start(LogLevel::Info, Some("application.log"))?;

    log_info!(logger, "Application started");
    log_warn!(logger, "Using default settings for some options");
    log_msg!(logger, "---- undecorated separator ----");

    println!("Only network messages from here on:");
    logger.set_mask_filter(MASK_SYS | MASK_NET);
    log_write!(logger, MASK_NET, LogLevel::Info, Destinations::FILE | Destinations::CONSOLE, "listening on {}", "0.0.0.0:8080");
    log_write!(logger, MASK_DB, LogLevel::Info, Destinations::FILE | Destinations::CONSOLE, "pool size {}", 16);

    logger.stop();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");
    Ok(())
}
