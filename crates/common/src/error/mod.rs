//! Errors raised by the shared runtime utilities
//!
//! These cover lifecycle management of background tasks; domain failures use
//! `carrierlink_domain::GatewayError` instead.

use std::time::Duration;

use thiserror::Error;

/// Error type for common utilities
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Invalid state or configuration for the requested operation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A background task did not finish in time
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CommonError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }
}

/// Result alias for common utilities
pub type CommonResult<T> = Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_operation() {
        let err = CommonError::timeout("cache_sweeper", Duration::from_secs(5));
        assert!(err.to_string().contains("cache_sweeper"));
    }

    #[test]
    fn test_config_constructor() {
        assert_eq!(
            CommonError::config("already running"),
            CommonError::Config { message: "already running".into() }
        );
    }
}
