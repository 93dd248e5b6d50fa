use std::time::Duration;

use carrierlink_domain::{ErrorCategory, GatewayError};
use tracing::{info, warn};

/// Log the outcome of a partner command with structured fields.
///
/// `command` is the command kind label (e.g. `"activate"`). Callers must not
/// pass msisdns or other subscriber data through it.
#[inline]
pub fn log_command_execution(
    command: &str,
    partner_id: &str,
    external_id: &str,
    elapsed: Duration,
    outcome: Result<(), &GatewayError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(command, partner_id, external_id, duration_ms, "command_execution_success"),
        Err(err) => warn!(
            command,
            partner_id,
            external_id,
            duration_ms,
            error_type = error_label(err),
            retryable = err.is_retryable(),
            "command_execution_failure"
        ),
    }
}

/// Stable label for `error`, suitable for log fields and partner replies.
#[inline]
pub fn error_label(error: &GatewayError) -> &'static str {
    match error.category() {
        ErrorCategory::Credentials => "credentials",
        ErrorCategory::Rejected => "rejected",
        ErrorCategory::Transport => "transport",
        ErrorCategory::NotFound => "not_found",
        ErrorCategory::Malformed => "malformed",
        ErrorCategory::Internal => "internal",
    }
}
