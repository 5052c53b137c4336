//! Error types and handling for the Whirl library

use thiserror::Error;

/// Result type alias for Whirl operations
pub type Result<T> = std::result::Result<T, WhirlError>;

/// Main error type for the Whirl library
#[derive(Error, Debug)]
pub enum WhirlError {
    /// Invalid configuration parameter
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Operation did not complete before its deadline
    #[error("Operation timed out")]
    Timeout,

    /// Container has been terminated; the operation was a no-op
    #[error("Container is terminated")]
    Terminated,

    /// Generic error for unexpected conditions.
    /// This error should be used for situations that are not expected to happen
    /// in a correctly functioning system, such as a logic error in the code.
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Error message describing the unexpected condition
        message: String,
    },
}

impl WhirlError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// A timed-out wait can simply be retried. A terminated container never
    /// accepts further operations and a bad configuration never fixes itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if this error signals the one-way terminated state
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::error::WhirlError::config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = WhirlError::config("test message");
        assert!(matches!(err, WhirlError::InvalidConfig { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_error_classification() {
        let timeout = WhirlError::Timeout;
        assert!(timeout.is_recoverable());
        assert!(!timeout.is_terminated());

        let terminated = WhirlError::Terminated;
        assert!(!terminated.is_recoverable());
        assert!(terminated.is_terminated());
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("Invalid capacity: {}", 1);
        assert!(matches!(err, WhirlError::InvalidConfig { .. }));
    }
}
