//! Error types used throughout the gateway

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`GatewayError`], used for logging and for
/// mapping errors onto the status reported back to partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Upstream login failed before the provisioning call was attempted
    Credentials,
    /// Upstream answered, but with a non-success status
    Rejected,
    /// Upstream could not be reached at all
    Transport,
    /// The command referenced state we do not hold
    NotFound,
    /// Inbound or upstream data could not be understood
    Malformed,
    /// Local persistence or wiring problem
    Internal,
}

/// Main error type for the gateway
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum GatewayError {
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Upstream rejected request with status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Subscription not found for msisdn {msisdn} and offer {offer_code}")]
    SubscriptionNotFound { msisdn: String, offer_code: String },

    #[error("Reconciliation failure: {0}")]
    ReconciliationFailure(String),

    #[error("Malformed upstream response ({reason}): {body}")]
    MalformedResponse { reason: String, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CredentialUnavailable(_) => ErrorCategory::Credentials,
            Self::UpstreamRejected { .. } => ErrorCategory::Rejected,
            Self::UpstreamUnreachable(_) => ErrorCategory::Transport,
            Self::SubscriptionNotFound { .. } | Self::ReconciliationFailure(_) => {
                ErrorCategory::NotFound
            }
            Self::MalformedResponse { .. } | Self::InvalidInput(_) => ErrorCategory::Malformed,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a caller could sensibly try the same command again later.
    ///
    /// The gateway itself never retries; this only informs the partner-facing
    /// layer.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Credentials | ErrorCategory::Transport)
    }

    /// Upstream HTTP status attached to a rejection, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
