//! Proportional jitter to spread out retries from independent callers.
//!
//! A jitter of `j` draws a factor `f` uniformly from `[-j, +j]` and scales the delay by
//! `1 + f`. The result is clamped to `[0, ceiling]`, so jitter can shorten a delay to zero but
//! never push it past the configured maximum.
//!
//! Notes:
//! - RNG: uses `rand`'s thread-local RNG by default; deterministic RNGs can be injected via
//!   `apply_with_rng`.
//! - `Jitter::none()` returns the delay unchanged (still clamped to the ceiling).
//!
//! Example:
//! ```rust
//! use secondwind::Jitter;
//! use std::time::Duration;
//!
//! let jitter = Jitter::new(0.2);
//! let delay = jitter.apply(Duration::from_millis(100), Duration::from_secs(1));
//! assert!(delay >= Duration::from_millis(79) && delay <= Duration::from_millis(121));
//! ```

use rand::{rng, Rng};
use std::time::Duration;

/// Fraction of a delay that may be randomly added or subtracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    fraction: f64,
}

impl Jitter {
    /// Create a jitter of `fraction`. Values outside `[0, 1]` are clamped; NaN disables jitter.
    /// `RetryOptions::validate` rejects such values before they ever reach here.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Self { fraction }
    }

    /// No jitter - use exact backoff delay
    pub fn none() -> Self {
        Self { fraction: 0.0 }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn is_none(&self) -> bool {
        self.fraction == 0.0
    }

    /// Apply jitter to a delay, clamping the result to `[0, ceiling]`.
    pub fn apply(&self, delay: Duration, ceiling: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, ceiling, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing)
    pub fn apply_with_rng<R: Rng>(
        &self,
        delay: Duration,
        ceiling: Duration,
        rng: &mut R,
    ) -> Duration {
        let delay = delay.min(ceiling);
        if self.is_none() || delay.is_zero() {
            return delay;
        }
        let factor = rng.random_range(-self.fraction..=self.fraction);
        let secs = (delay.as_secs_f64() * (1.0 + factor)).clamp(0.0, ceiling.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(ceiling).min(ceiling)
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::none()
    }
}

impl From<f64> for Jitter {
    fn from(fraction: f64) -> Self {
        Self::new(fraction)
    }
}
