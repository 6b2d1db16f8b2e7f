use thiserror::Error;

use crate::domain::breaker::CircuitOpenError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Outcome of a guarded call that did not produce a value.
///
/// `Failed` always carries the operation's own error, never a wrapper, so
/// callers can match on their domain error type directly.
#[derive(Error, Debug)]
pub enum CallError<E> {
    #[error(transparent)]
    CircuitOpen(#[from] CircuitOpenError),

    #[error("{0}")]
    Failed(E),
}

impl<E> CallError<E> {
    /// True when the call was rejected without invoking the operation.
    #[must_use]
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }

    /// The operation's own error, if it ran and failed.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::CircuitOpen(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("component not registered: {0}")]
    UnknownComponent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn call_error_distinguishes_rejection_from_failure() {
        let rejected: CallError<&str> = CircuitOpenError {
            retry_after: Duration::from_secs(5),
        }
        .into();
        let failed: CallError<&str> = CallError::Failed("timeout");

        assert!(rejected.is_circuit_open());
        assert!(!failed.is_circuit_open());
        assert_eq!(failed.into_inner(), Some("timeout"));
        assert_eq!(rejected.into_inner(), None);
    }

    #[test]
    fn call_error_display_is_transparent() {
        let failed: CallError<String> = CallError::Failed("connection refused".to_string());
        assert_eq!(failed.to_string(), "connection refused");

        let rejected: CallError<String> = CircuitOpenError {
            retry_after: Duration::from_secs(12),
        }
        .into();
        assert_eq!(rejected.to_string(), "circuit breaker is open (retry in 12s)");
    }

    #[test]
    fn unknown_component_message() {
        let err = Error::UnknownComponent("db".to_string());
        assert_eq!(err.to_string(), "component not registered: db");
    }
}
