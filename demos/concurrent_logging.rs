//! Concurrent logging example
//!
//! Several threads write through one shared logger; the worker serializes
//! every line and `stop()` drains the queue before returning.
//!
//! Run with: cargo run --example concurrent_logging

use serial_logger::prelude::*;
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Serial Logger - Concurrent Logging Example ===\n");

    let logger = Arc::new(
        Logger::builder()
            .format(FormatOptions::new(false, true, false))
            .build(),
    );
    logger.start(LogLevel::Info, Some("concurrent.log"))?;

    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..20 {
                    logger.write(
                        MASK_SYS,
                        LogLevel::Info,
                        Destinations::FILE,
                        "worker",
                        format_args!("Thread {} - Message {}", thread_id, i),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("producer thread panicked");
    }

    logger.stop();

    let metrics = logger.metrics();
    println!("   Written: {}", metrics.written());
    println!("   Filtered: {}", metrics.filtered());
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
