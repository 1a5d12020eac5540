//! Retry configuration.
//!
//! `RetryOptions` is a plain value with public fields so it can be built incrementally,
//! shared, and edited between calls. It is validated at the start of every execution rather
//! than at construction, which means an invalid value is always caught before the first
//! attempt regardless of how it was assembled.
//!
//! ```rust
//! use secondwind::RetryOptions;
//! use std::time::Duration;
//!
//! let options = RetryOptions::new()
//!     .max_attempts(5)
//!     .base_delay(Duration::from_millis(200))
//!     .max_delay(Duration::from_secs(5))
//!     .jitter(0.1);
//! assert!(options.validate().is_ok());
//! ```

use crate::backoff::Backoff;
use crate::error::ConfigError;
use crate::jitter::Jitter;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_DELAY_MILLIS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MILLIS: u64 = 30_000;
pub const DEFAULT_USE_EXPONENTIAL_BACKOFF: bool = true;
pub const DEFAULT_JITTER: f64 = 0.2;

/// Configuration for a `RetryExecutor`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryOptions {
    /// Total attempts including the first. Must be >= 1.
    pub max_attempts: usize,
    /// Delay before the second attempt. Must be > 0.
    #[cfg_attr(feature = "serde", serde(rename = "delay_ms", with = "millis"))]
    pub base_delay: Duration,
    /// Upper bound on any computed delay. Must be >= `base_delay`.
    #[cfg_attr(feature = "serde", serde(rename = "max_delay_ms", with = "millis"))]
    pub max_delay: Duration,
    /// Double the delay after each failed attempt instead of keeping it constant.
    pub use_exponential_backoff: bool,
    /// Fraction in `[0, 1]` of each delay that may be randomly added or subtracted.
    pub jitter: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_DELAY_MILLIS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MILLIS),
            use_exponential_backoff: DEFAULT_USE_EXPONENTIAL_BACKOFF,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl RetryOptions {
    /// Options with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set total attempts (initial + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Grow the delay geometrically with the attempt index.
    pub fn exponential(mut self) -> Self {
        self.use_exponential_backoff = true;
        self
    }

    /// Keep the delay at `base_delay` for every retry.
    pub fn constant(mut self) -> Self {
        self.use_exponential_backoff = false;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Check every invariant, reporting the first violated field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts < 1 {
            return Err(ConfigError::MaxAttempts(self.max_attempts));
        }
        if self.base_delay.is_zero() {
            return Err(ConfigError::BaseDelay(self.base_delay));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::MaxDelay { base: self.base_delay, max: self.max_delay });
        }
        // NaN fails the range check
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::Jitter(self.jitter));
        }
        Ok(())
    }

    /// Deterministic part of the schedule.
    pub fn backoff(&self) -> Backoff {
        Backoff::from_options(self)
    }

    pub fn jitter_strategy(&self) -> Jitter {
        Jitter::new(self.jitter)
    }

    /// Jittered delay to wait after `attempt` (1-based) failed.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.jitter_strategy().apply(self.backoff().delay(attempt), self.max_delay)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
