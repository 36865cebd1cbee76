//! Timer-driven logging: a heartbeat every second plus a status line from
//! the main thread, all written by the background writer.
//!
//! Run with `cargo run --example heartbeat -- [path]`.

use diary::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "heartbeat.txt".to_string());

    let logger = Logger::builder(&path).also_print(true).build()?;

    let mut beats = 0u64;
    logger.set_timer(Duration::from_secs(1), move |producer| {
        beats += 1;
        producer.info(format!("heartbeat #{}", beats))
    })?;

    for step in 0..5 {
        std::thread::sleep(Duration::from_millis(1500));
        if step % 2 == 0 {
            logger.info(format!("service is up (step {})", step))?;
        } else {
            logger.warn(format!("service is slow (step {})", step))?;
        }
    }

    logger.close()?;
    println!(
        "{} records written to {}, {} timer ticks",
        logger.metrics().written(),
        path,
        logger.metrics().timer_ticks()
    );
    Ok(())
}
