//! Error types for flipper operations.

use crate::gates::GateKey;
use thiserror::Error;

/// Result type for flipper operations.
pub type FlipperResult<T> = Result<T, FlipperError>;

/// Flipper errors.
#[derive(Debug, Error)]
pub enum FlipperError {
    /// An actor-scoped enable/disable was called without actors.
    #[error("there are no actors to {operation} the feature for")]
    NoActors {
        /// `enable` or `disable`
        operation: &'static str,
    },

    /// A group-scoped enable/disable was called without groups.
    #[error("there are no groups to {operation} the feature for")]
    NoGroups {
        /// `enable` or `disable`
        operation: &'static str,
    },

    /// Percentage outside of 0..=100 with strict percentages enabled.
    #[error("invalid percentage {0}, expected a value between 0 and 100")]
    InvalidPercentage(u32),

    /// Backend configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store used before being configured
    #[error("Store not configured: {0}")]
    NotConfigured(String),

    /// A persisted value doesn't have the shape its gate key requires.
    #[error("unexpected value stored for gate {key}: {value}")]
    UnexpectedValue {
        /// Gate the value was read for
        key: GateKey,
        /// Debug rendering of the offending value
        value: String,
    },

    /// Gate key not recognized by the backend.
    #[error("unsupported gate: {0}")]
    UnsupportedGate(String),

    /// Error raised by the storage backend.
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FlipperError {
    /// Wrap any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    /// Build an [`FlipperError::UnexpectedValue`] from anything debuggable.
    pub fn unexpected(key: GateKey, value: impl std::fmt::Debug) -> Self {
        Self::UnexpectedValue {
            key,
            value: format!("{:?}", value),
        }
    }

    /// Check if the error was caused by invalid caller input.
    ///
    /// Caller errors are raised before the store is touched.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NoActors { .. } | Self::NoGroups { .. } | Self::InvalidPercentage(_)
        )
    }

    /// Check if the error came from the storage backend.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            Self::Backend(_) | Self::UnexpectedValue { .. } | Self::UnsupportedGate(_)
        )
    }
}
