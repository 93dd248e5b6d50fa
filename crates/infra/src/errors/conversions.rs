//! Conversions from external infrastructure errors into domain errors.

use carrierlink_domain::GatewayError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GatewayError);

impl From<InfraError> for GatewayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GatewayError> for InfraError {
    fn from(value: GatewayError) -> Self {
        InfraError(value)
    }
}

trait IntoGatewayError {
    fn into_gateway(self) -> GatewayError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for SqlError {
    fn into_gateway(self) -> GatewayError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        GatewayError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        GatewayError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        GatewayError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => GatewayError::Database(format!(
                        "foreign key constraint violation: {message}"
                    )),
                    _ => GatewayError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => GatewayError::Database("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                GatewayError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GatewayError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GatewayError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GatewayError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(GatewayError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(GatewayError::Internal(format!("JSON encoding failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for HttpError {
    fn into_gateway(self) -> GatewayError {
        if self.is_builder() {
            return GatewayError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return GatewayError::UpstreamUnreachable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return GatewayError::UpstreamUnreachable(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return GatewayError::UpstreamRejected {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if self.is_decode() || self.is_body() {
            return GatewayError::UpstreamUnreachable(format!("failed to read HTTP body: {self}"));
        }

        GatewayError::UpstreamUnreachable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_gateway())
    }
}

/// Shorthand used by the repositories and HTTP adapters
pub(crate) fn to_gateway<E>(err: E) -> GatewayError
where
    InfraError: From<E>,
{
    GatewayError::from(InfraError::from(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
