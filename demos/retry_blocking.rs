//! Blocking retry of a flaky file read.
use secondwind::prelude::*;
use std::time::Duration;

fn main() -> Result<(), RetryError<std::io::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let executor = RetryExecutor::new(
        RetryOptions::new()
            .max_attempts(4)
            .base_delay(Duration::from_millis(50))
            .max_delay(Duration::from_millis(400))
            .jitter(0.2),
    );

    let mut calls = 0;
    let contents = executor
        .call()
        .label("read settings")
        .should_retry(|e: &std::io::Error| e.kind() != std::io::ErrorKind::PermissionDenied)
        .execute(|| {
            calls += 1;
            if calls < 3 {
                // Replace with your real fallible work
                Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "file locked"))
            } else {
                Ok("theme = dark")
            }
        })?;

    println!("{} (after {} attempts)", contents, calls);
    Ok(())
}
