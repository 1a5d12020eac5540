//! Retry state machine shared by the blocking and async execution loops.
//!
//! The schedule owns the attempt counter and decides, after each failure, whether to retry
//! (and after how long), give up, or propagate. It never invokes the operation or waits; the
//! execution loops do that in their own way.
//!
//! Invariants:
//! - The attempt index starts at 1 and never exceeds `max_attempts`.
//! - A delay is only computed when another attempt will follow.

use crate::backoff::Backoff;
use crate::error::ConfigError;
use crate::jitter::Jitter;
use crate::options::RetryOptions;
use std::time::{Duration, Instant};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Wait `delay`, then run the next attempt.
    Retry { delay: Duration },
    /// The error must be returned as-is.
    NonRetryable,
    /// The failed attempt was the last one permitted.
    Exhausted,
}

#[derive(Debug)]
pub(crate) struct RetrySchedule {
    max_attempts: usize,
    backoff: Backoff,
    jitter: Jitter,
    attempt: usize,
    started: Instant,
}

impl RetrySchedule {
    /// Validate `options` and position the schedule at attempt 1.
    pub(crate) fn start(options: &RetryOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            max_attempts: options.max_attempts,
            backoff: options.backoff(),
            jitter: options.jitter_strategy(),
            attempt: 1,
            started: Instant::now(),
        })
    }

    /// 1-based index of the attempt currently running (or about to run).
    pub(crate) fn attempt(&self) -> usize {
        self.attempt
    }

    /// Attempts fully completed before the current one.
    pub(crate) fn completed(&self) -> usize {
        self.attempt - 1
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Classify the failure of the current attempt, advancing to the next attempt on `Retry`.
    pub(crate) fn on_failure(&mut self, retryable: bool) -> Decision {
        if !retryable {
            return Decision::NonRetryable;
        }
        if self.attempt >= self.max_attempts {
            return Decision::Exhausted;
        }
        let delay = self.jitter.apply(self.backoff.delay(self.attempt), self.backoff.max());
        self.attempt += 1;
        Decision::Retry { delay }
    }
}
