//! Backoff strategies for retry execution.
//!
//! Attempt semantics: attempt index `0` represents the initial call (no delay); `delay(n)` for
//! `n >= 1` is the wait after the `n`-th attempt failed. Every delay is capped at the configured
//! maximum, and exponential growth saturates at that cap instead of overflowing.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use secondwind::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100), Duration::from_secs(2));
//! assert_eq!(backoff.delay(0), Duration::ZERO); // initial call
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```

use crate::options::RetryOptions;
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackoffKind {
    Constant,
    Exponential,
}

/// Deterministic (jitter-free) delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    kind: BackoffKind,
    base: Duration,
    max: Duration,
}

impl Backoff {
    /// Same delay before every retry, capped at `max`.
    pub fn constant(delay: Duration, max: Duration) -> Self {
        Self { kind: BackoffKind::Constant, base: delay, max }
    }

    /// `base * 2^(n-1)` before retry `n`, capped at `max`.
    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self { kind: BackoffKind::Exponential, base, max }
    }

    /// Backoff described by a set of options.
    pub fn from_options(options: &RetryOptions) -> Self {
        if options.use_exponential_backoff {
            Self::exponential(options.base_delay, options.max_delay)
        } else {
            Self::constant(options.base_delay, options.max_delay)
        }
    }

    pub fn is_exponential(&self) -> bool {
        self.kind == BackoffKind::Exponential
    }

    /// Ceiling applied to every delay.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay for a given attempt number (0 = initial call, no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let raw = match self.kind {
            BackoffKind::Constant => self.base,
            BackoffKind::Exponential => {
                let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
                let max_nanos = self.max.as_nanos();
                match 2u128.checked_pow(exponent) {
                    Some(multiplier) => {
                        let nanos = self.base.as_nanos().saturating_mul(multiplier);
                        if nanos >= max_nanos {
                            self.max
                        } else {
                            // below max, so it fits in a Duration
                            Duration::new(
                                (nanos / NANOS_PER_SEC) as u64,
                                (nanos % NANOS_PER_SEC) as u32,
                            )
                        }
                    }
                    None => self.max,
                }
            }
        };
        raw.min(self.max)
    }
}

impl From<&RetryOptions> for Backoff {
    fn from(options: &RetryOptions) -> Self {
        Self::from_options(options)
    }
}
