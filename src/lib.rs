#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Second Wind
//!
//! Retry execution for Rust: run a fallible operation again under a backoff policy, from
//! blocking or async code, with jitter and cooperative cancellation.
//!
//! ## Features
//!
//! - **Blocking and async** entry points sharing one retry state machine
//! - **Backoff**: constant or exponential, capped, overflow-safe
//! - **Jitter**: proportional randomization to avoid synchronized retry storms
//! - **Cancellation** via `tokio_util::sync::CancellationToken`, observed during attempts and waits
//! - **Typed outcomes**: configuration errors, non-retryable errors, cancellation, exhaustion
//! - **Telemetry** hooks and structured `tracing` logs
//!
//! ## Quick Start
//!
//! ```rust
//! use secondwind::{RetryExecutor, RetryOptions, RetryError};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor = RetryExecutor::new(
//!         RetryOptions::new()
//!             .max_attempts(3)
//!             .base_delay(Duration::from_millis(10))
//!             .max_delay(Duration::from_millis(100)),
//!     );
//!
//!     let result: Result<&str, RetryError<std::io::Error>> = executor
//!         .call()
//!         .label("ping")
//!         .execute_async(|| async {
//!             // Your async operation here
//!             Ok("pong")
//!         })
//!         .await;
//!     assert_eq!(result.unwrap(), "pong");
//! }
//! ```

pub mod backoff;
pub mod error;
pub mod executor;
pub mod jitter;
pub mod options;
pub mod prelude;
pub mod presets;
mod schedule;
pub mod sleeper;
pub mod telemetry;

// Re-exports
pub use backoff::Backoff;
pub use error::{ConfigError, OptionField, RetryError};
pub use executor::{RetryCall, RetryExecutor};
pub use jitter::Jitter;
pub use options::RetryOptions;
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use telemetry::{LogObserver, MemoryObserver, NullObserver, RetryEvent, RetryObserver};
pub use tokio_util::sync::CancellationToken;
