//! Outbound header composition

use std::sync::Arc;

use carrierlink_domain::constants::{
    HEADER_API_KEY, HEADER_AUTHORIZATION, HEADER_CONVERSATION_ID, HEADER_MESSAGE_ID,
    HEADER_SECONDARY_AUTH, HEADER_SOURCE_TIMESTAMP, STATIC_UPSTREAM_HEADERS,
};
use carrierlink_domain::Result;
use tracing::instrument;

use super::credentials::{CachedCredential, SharedClock};
use super::ports::RequestHeaders;

/// Builds the fixed carrier header set around two bearer tokens
pub struct HeaderBuilder {
    carrier: Arc<CachedCredential>,
    gateway: Arc<CachedCredential>,
    api_key: String,
    clock: SharedClock,
}

impl HeaderBuilder {
    pub fn new(
        carrier: Arc<CachedCredential>,
        gateway: Arc<CachedCredential>,
        api_key: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        Self { carrier, gateway, api_key: api_key.into(), clock }
    }

    /// Compose headers for one provisioning call.
    ///
    /// Both credentials are resolved first; the correlation id is used for
    /// the conversation and message id headers.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::CredentialUnavailable` if either login fails.
    #[instrument(skip(self))]
    pub async fn build_headers(&self, correlation_id: &str) -> Result<RequestHeaders> {
        let (carrier_token, gateway_token) =
            tokio::try_join!(self.carrier.token(), self.gateway.token())?;

        let mut headers = RequestHeaders::new();
        for (name, value) in STATIC_UPSTREAM_HEADERS {
            headers.insert(name, value);
        }
        headers.insert(HEADER_AUTHORIZATION, format!("Bearer {carrier_token}"));
        headers.insert(HEADER_SECONDARY_AUTH, format!("Bearer {gateway_token}"));
        headers.insert(HEADER_API_KEY, self.api_key.as_str());
        headers.insert(HEADER_CONVERSATION_ID, correlation_id);
        headers.insert(HEADER_MESSAGE_ID, correlation_id);
        headers.insert(HEADER_SOURCE_TIMESTAMP, self.clock.unix_seconds().to_string());

        Ok(headers)
    }
}
