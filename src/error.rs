//! Error types for retry execution.
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Names the `RetryOptions` field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionField {
    MaxAttempts,
    BaseDelay,
    MaxDelay,
    Jitter,
}

impl OptionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionField::MaxAttempts => "MaxAttempts",
            OptionField::BaseDelay => "BaseDelay",
            OptionField::MaxDelay => "MaxDelay",
            OptionField::Jitter => "Jitter",
        }
    }
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invalid `RetryOptions`, reported before any attempt is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid retry configuration: MaxAttempts must be >= 1 (got {0})")]
    MaxAttempts(usize),
    #[error("invalid retry configuration: BaseDelay must be > 0 (got {0:?})")]
    BaseDelay(Duration),
    #[error("invalid retry configuration: MaxDelay ({max:?}) must be >= BaseDelay ({base:?})")]
    MaxDelay { base: Duration, max: Duration },
    #[error("invalid retry configuration: Jitter must be within [0, 1] (got {0})")]
    Jitter(f64),
}

impl ConfigError {
    /// The offending option.
    pub fn field(&self) -> OptionField {
        match self {
            ConfigError::MaxAttempts(_) => OptionField::MaxAttempts,
            ConfigError::BaseDelay(_) => OptionField::BaseDelay,
            ConfigError::MaxDelay { .. } => OptionField::MaxDelay,
            ConfigError::Jitter(_) => OptionField::Jitter,
        }
    }
}

/// Outcome of a retry execution that did not produce a value.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The options were invalid; no attempt was made.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The operation failed with an error classified as non-retryable. Returned unchanged.
    #[error("{0}")]
    Inner(E),
    /// The cancellation token fired before or during an attempt, or during a backoff wait.
    #[error("retry of '{label}' cancelled after {attempts} attempt(s)")]
    Cancelled { label: String, attempts: usize },
    /// Every permitted attempt failed.
    #[error("retry exhausted for '{label}' after {attempts} attempt(s); last error: {source}")]
    Exhausted {
        label: String,
        attempts: usize,
        #[source]
        source: E,
    },
}

impl<E> RetryError<E> {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Access the configuration error if validation failed.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }

    /// Get the non-retryable error if this is an `Inner` variant.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the non-retryable error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// The most recent operation error, for `Inner` and `Exhausted`.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Inner(e) | Self::Exhausted { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Consume the error and return the most recent operation error, if any.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::Inner(e) | Self::Exhausted { source: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Attempts made before giving up (cancelled or exhausted).
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::Cancelled { attempts, .. } | Self::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Operation label carried by cancelled and exhausted outcomes.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Cancelled { label, .. } | Self::Exhausted { label, .. } => Some(label),
            _ => None,
        }
    }
}
