//! Convenient re-exports for common Second Wind types.
pub use crate::{
    backoff::Backoff,
    error::{ConfigError, OptionField, RetryError},
    executor::{RetryCall, RetryExecutor},
    jitter::Jitter,
    options::RetryOptions,
    presets,
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    telemetry::{LogObserver, MemoryObserver, NullObserver, RetryEvent, RetryObserver},
    CancellationToken,
};
