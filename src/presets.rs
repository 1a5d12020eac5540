//! Ready-made `RetryOptions` for common workloads.
//!
//! ```rust
//! use secondwind::{presets, RetryExecutor};
//!
//! let executor = RetryExecutor::new(presets::fast());
//! assert_eq!(executor.options().max_attempts, 5);
//! ```
//!
//! ## Available Presets
//!
//! - [`fast`]: in-cluster calls and caches (many quick retries, 1s ceiling)
//! - [`standard`]: the library defaults
//! - [`patient`]: third-party APIs and slow dependencies (long ceiling, more spread)
//! - [`no_retry`]: a single attempt, still validated and observed

use crate::options::RetryOptions;
use std::time::Duration;

const FAST_ATTEMPTS: usize = 5;
const FAST_DELAY_MILLIS: u64 = 50;
const FAST_MAX_DELAY_MILLIS: u64 = 1_000;
const FAST_JITTER: f64 = 0.2;

const PATIENT_ATTEMPTS: usize = 8;
const PATIENT_DELAY_MILLIS: u64 = 2_000;
const PATIENT_MAX_DELAY_MILLIS: u64 = 60_000;
const PATIENT_JITTER: f64 = 0.5;

/// 5 attempts, exponential from 50ms, capped at 1s, 20% jitter.
pub fn fast() -> RetryOptions {
    RetryOptions::new()
        .max_attempts(FAST_ATTEMPTS)
        .base_delay(Duration::from_millis(FAST_DELAY_MILLIS))
        .max_delay(Duration::from_millis(FAST_MAX_DELAY_MILLIS))
        .exponential()
        .jitter(FAST_JITTER)
}

/// 3 attempts, exponential from 1s, capped at 30s, 20% jitter.
pub fn standard() -> RetryOptions {
    RetryOptions::default()
}

/// 8 attempts, exponential from 2s, capped at 60s, 50% jitter.
pub fn patient() -> RetryOptions {
    RetryOptions::new()
        .max_attempts(PATIENT_ATTEMPTS)
        .base_delay(Duration::from_millis(PATIENT_DELAY_MILLIS))
        .max_delay(Duration::from_millis(PATIENT_MAX_DELAY_MILLIS))
        .exponential()
        .jitter(PATIENT_JITTER)
}

/// A single attempt.
pub fn no_retry() -> RetryOptions {
    RetryOptions::new().max_attempts(1)
}
