//! Retry executor
//!
//! Runs a fallible operation until it succeeds, is classified as non-retryable, runs out of
//! attempts, or is cancelled.
//!
//! Semantics:
//! - `max_attempts` counts total attempts (initial try + retries).
//! - Options are validated at the start of every call; an invalid configuration returns
//!   `RetryError::Config` before the operation is invoked.
//! - `should_retry` decides whether an error is retryable. Non-retryable errors come back
//!   unchanged as `RetryError::Inner`.
//! - After the last permitted attempt fails, `RetryError::Exhausted` carries the most recent
//!   error. No delay is computed or waited after the last attempt.
//! - The async surface races both the operation and the backoff wait against an optional
//!   `CancellationToken`. Cancellation wins over every other outcome and is reported as
//!   `RetryError::Cancelled`.
//! - The blocking surface checks the token before each attempt and after each failure, but
//!   cannot interrupt a blocking wait that has already started.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use secondwind::{RetryExecutor, RetryOptions, RetryError, InstantSleeper};
//!
//! let executor = RetryExecutor::new(RetryOptions::new().max_attempts(3))
//!     .with_sleeper(InstantSleeper);
//! let mut calls = 0;
//! let result: Result<u32, RetryError<std::io::Error>> = executor
//!     .call()
//!     .label("read config")
//!     .execute(|| {
//!         calls += 1;
//!         if calls < 3 {
//!             Err(std::io::Error::new(std::io::ErrorKind::Other, "busy"))
//!         } else {
//!             Ok(42)
//!         }
//!     });
//! assert_eq!(result.unwrap(), 42);
//! ```

use crate::error::RetryError;
use crate::options::RetryOptions;
use crate::schedule::{Decision, RetrySchedule};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::telemetry::{NullObserver, RetryEvent, RetryObserver};
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Stateless retry orchestrator. Cheap to clone and safe to share across threads and tasks.
#[derive(Clone)]
pub struct RetryExecutor {
    options: RetryOptions,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn RetryObserver>,
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("options", &self.options)
            .field("sleeper", &self.sleeper)
            .field("observer", &self.observer)
            .finish()
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryOptions::default())
    }
}

impl From<RetryOptions> for RetryExecutor {
    fn from(options: RetryOptions) -> Self {
        Self::new(options)
    }
}

impl From<Option<RetryOptions>> for RetryExecutor {
    fn from(options: Option<RetryOptions>) -> Self {
        Self::new(options.unwrap_or_default())
    }
}

impl RetryExecutor {
    /// Executor with the given options, real sleeping, and no telemetry.
    pub fn new(options: RetryOptions) -> Self {
        Self { options, sleeper: Arc::new(TokioSleeper), observer: Arc::new(NullObserver) }
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Report lifecycle events to `observer`.
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: RetryObserver + 'static,
    {
        self.observer = Arc::new(observer);
        self
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// Edit the options in place. Changes are validated on the next call.
    pub fn options_mut(&mut self) -> &mut RetryOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: RetryOptions) {
        self.options = options;
    }

    /// Start configuring a single call. The label defaults to the caller's source location.
    #[track_caller]
    pub fn call<E>(&self) -> RetryCall<'_, E> {
        RetryCall {
            executor: self,
            label: Label::Caller(Location::caller()),
            should_retry: None,
            cancel: None,
        }
    }

    /// Blocking execution with every error retryable.
    #[track_caller]
    pub fn execute<T, E, Op>(&self, operation: Op) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        Op: FnMut() -> Result<T, E>,
    {
        self.call().execute(operation)
    }

    /// Async execution with every error retryable and no cancellation.
    #[track_caller]
    pub fn execute_async<'a, T, E, Fut, Op>(
        &'a self,
        operation: Op,
    ) -> impl Future<Output = Result<T, RetryError<E>>> + 'a
    where
        T: 'a,
        E: fmt::Display + 'a,
        Fut: Future<Output = Result<T, E>> + 'a,
        Op: FnMut() -> Fut + 'a,
    {
        self.call().execute_async(operation)
    }
}

/// Diagnostic name of an operation, resolved only when needed.
enum Label<'a> {
    Caller(&'static Location<'static>),
    Lazy(Box<dyn FnOnce() -> String + Send + Sync + 'a>),
    Resolved(String),
}

impl Label<'_> {
    fn resolve(&mut self) -> &str {
        if !matches!(self, Label::Resolved(_)) {
            let text = match std::mem::replace(self, Label::Resolved(String::new())) {
                Label::Caller(location) => location.to_string(),
                Label::Lazy(produce) => produce(),
                Label::Resolved(text) => text,
            };
            *self = Label::Resolved(text);
        }
        match self {
            Label::Resolved(text) => text.as_str(),
            _ => unreachable!("label resolved above"),
        }
    }
}

type RetryPredicate<'a, E> = Box<dyn Fn(&E) -> bool + Send + Sync + 'a>;

/// A single configured execution: label, retry predicate, and cancellation token.
pub struct RetryCall<'a, E> {
    executor: &'a RetryExecutor,
    label: Label<'a>,
    should_retry: Option<RetryPredicate<'a, E>>,
    cancel: Option<CancellationToken>,
}

impl<E> fmt::Debug for RetryCall<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCall")
            .field("executor", &self.executor)
            .field("should_retry", &self.should_retry.as_ref().map(|_| "<predicate>"))
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<'a, E> RetryCall<'a, E> {
    /// Name the operation in errors and telemetry.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Label::Resolved(label.into());
        self
    }

    /// Name the operation with a closure that only runs if the label is actually needed.
    pub fn label_with<F>(mut self, produce: F) -> Self
    where
        F: FnOnce() -> String + Send + Sync + 'a,
    {
        self.label = Label::Lazy(Box::new(produce));
        self
    }

    /// Predicate deciding whether an error is worth another attempt.
    pub fn should_retry<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'a,
    {
        self.should_retry = Some(Box::new(predicate));
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn cancel_on(mut self, token: &CancellationToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn emit(&self, event: impl FnOnce() -> RetryEvent) {
        let observer = &self.executor.observer;
        if observer.is_enabled() {
            observer.observe(&event());
        }
    }

    fn succeeded(&mut self, schedule: &RetrySchedule) {
        let attempts = schedule.attempt();
        if attempts > 1 {
            let label = self.label.resolve();
            tracing::trace!(label = %label, attempts, "retry succeeded");
        }
        if self.executor.observer.is_enabled() {
            let label = self.label.resolve().to_owned();
            self.emit(|| RetryEvent::Succeeded { label, attempts });
        }
    }

    fn cancelled(&mut self, attempts: usize) -> RetryError<E> {
        let label = self.label.resolve().to_owned();
        tracing::debug!(label = %label, attempts, "retry cancelled");
        self.emit(|| RetryEvent::Cancelled { label: label.clone(), attempts });
        RetryError::Cancelled { label, attempts }
    }

    /// Classify a failed attempt. Shared by both execution loops.
    fn on_failure(
        &mut self,
        schedule: &mut RetrySchedule,
        error: E,
    ) -> Result<Duration, RetryError<E>>
    where
        E: fmt::Display,
    {
        let attempt = schedule.attempt();
        let retryable = match &self.should_retry {
            Some(predicate) => predicate(&error),
            None => true,
        };
        match schedule.on_failure(retryable) {
            Decision::Retry { delay } => {
                let label = self.label.resolve();
                tracing::debug!(
                    label = %label,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "retrying after failure"
                );
                if self.executor.observer.is_enabled() {
                    let label = label.to_owned();
                    self.emit(|| RetryEvent::Attempt { label, attempt, delay });
                }
                Ok(delay)
            }
            Decision::NonRetryable => {
                let label = self.label.resolve();
                tracing::debug!(label = %label, attempt, error = %error, "non-retryable error");
                if self.executor.observer.is_enabled() {
                    let label = label.to_owned();
                    self.emit(|| RetryEvent::NonRetryable { label, attempt });
                }
                Err(RetryError::Inner(error))
            }
            Decision::Exhausted => {
                let label = self.label.resolve().to_owned();
                let elapsed = schedule.elapsed();
                tracing::warn!(
                    label = %label,
                    attempts = attempt,
                    error = %error,
                    "retries exhausted"
                );
                self.emit(|| RetryEvent::Exhausted {
                    label: label.clone(),
                    attempts: attempt,
                    elapsed,
                });
                Err(RetryError::Exhausted { label, attempts: attempt, source: error })
            }
        }
    }

    /// Run `operation` on the calling thread, blocking between attempts.
    pub fn execute<T, Op>(mut self, mut operation: Op) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        Op: FnMut() -> Result<T, E>,
    {
        let mut schedule = RetrySchedule::start(&self.executor.options)?;
        loop {
            if self.is_cancelled() {
                return Err(self.cancelled(schedule.completed()));
            }
            match operation() {
                Ok(value) => {
                    self.succeeded(&schedule);
                    return Ok(value);
                }
                Err(error) => {
                    if self.is_cancelled() {
                        return Err(self.cancelled(schedule.attempt()));
                    }
                    let delay = self.on_failure(&mut schedule, error)?;
                    self.executor.sleeper.sleep_blocking(delay);
                }
            }
        }
    }

    /// Run `operation` cooperatively, suspending between attempts.
    pub async fn execute_async<T, Fut, Op>(
        mut self,
        mut operation: Op,
    ) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        Fut: Future<Output = Result<T, E>>,
        Op: FnMut() -> Fut,
    {
        let mut schedule = RetrySchedule::start(&self.executor.options)?;
        let cancel = self.cancel.clone();
        loop {
            if self.is_cancelled() {
                return Err(self.cancelled(schedule.completed()));
            }
            let outcome = match &cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => None,
                    outcome = operation() => Some(outcome),
                },
                None => Some(operation().await),
            };
            let Some(outcome) = outcome else {
                return Err(self.cancelled(schedule.attempt()));
            };
            match outcome {
                Ok(value) => {
                    self.succeeded(&schedule);
                    return Ok(value);
                }
                Err(error) => {
                    // an operation that observed the token fails as cancelled, not retryable
                    if self.is_cancelled() {
                        return Err(self.cancelled(schedule.attempt()));
                    }
                    let delay = self.on_failure(&mut schedule, error)?;
                    let wait = self.executor.sleeper.sleep(delay);
                    let interrupted = match &cancel {
                        Some(token) => tokio::select! {
                            biased;
                            () = token.cancelled() => true,
                            () = wait => false,
                        },
                        None => {
                            wait.await;
                            false
                        }
                    };
                    if interrupted {
                        return Err(self.cancelled(schedule.completed()));
                    }
                }
            }
        }
    }
}
