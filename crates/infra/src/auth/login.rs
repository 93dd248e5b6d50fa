//! Upstream login clients
//!
//! The carrier and the gateway issue tokens through different flows:
//!
//! - carrier: empty form POST authenticated with HTTP Basic, `{access_token}`
//! - gateway: JSON `{username, password}` POST, `{token}`
//!
//! Neither client caches; that is the job of
//! [`CachedCredential`](carrierlink_core::CachedCredential).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use carrierlink_core::LoginClient;
use carrierlink_domain::{GatewayError, LoginConfig, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Serialize)]
struct PasswordLogin<'a> {
    username: &'a str,
    password: &'a str,
}

/// Send a login request and decode its JSON reply into `T`.
async fn send_login<T>(provider: &str, url: &str, request: RequestBuilder) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let unavailable = |reason: String| GatewayError::CredentialUnavailable(format!("{provider} login: {reason}"));

    let response = request.send().await.map_err(|err| unavailable(err.to_string()))?;
    let status = response.status();
    let body = response.text().await.map_err(|err| unavailable(err.to_string()))?;
    debug!(provider, url, status = status.as_u16(), "Login response received");

    if !status.is_success() {
        return Err(unavailable(format!("HTTP {} {}", status.as_u16(), body)));
    }

    serde_json::from_str(&body).map_err(|err| unavailable(format!("unreadable response: {err}")))
}

fn missing(provider: &str, field: &str) -> GatewayError {
    GatewayError::CredentialUnavailable(format!("{provider} login response has no {field}"))
}

/// Basic-auth form login against the carrier's token endpoint
#[derive(Debug, Clone)]
pub struct CarrierLoginClient {
    client: HttpClient,
    config: LoginConfig,
}

impl CarrierLoginClient {
    pub fn new(client: HttpClient, config: LoginConfig) -> Self {
        Self { client, config }
    }

    fn basic_credentials(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.config.username, self.config.password))
    }
}

#[async_trait]
impl LoginClient for CarrierLoginClient {
    fn name(&self) -> &str {
        "carrier"
    }

    #[instrument(skip(self), fields(url = %self.config.url))]
    async fn login(&self) -> Result<String> {
        let request = self
            .client
            .request(Method::POST, self.config.url.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(AUTHORIZATION, format!("Basic {}", self.basic_credentials()));

        let reply: AccessTokenResponse = send_login(self.name(), &self.config.url, request).await?;
        reply.access_token.ok_or_else(|| missing(self.name(), "access_token"))
    }
}

/// JSON username/password login against the gateway's auth endpoint
#[derive(Debug, Clone)]
pub struct GatewayLoginClient {
    client: HttpClient,
    config: LoginConfig,
}

impl GatewayLoginClient {
    pub fn new(client: HttpClient, config: LoginConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl LoginClient for GatewayLoginClient {
    fn name(&self) -> &str {
        "gateway"
    }

    #[instrument(skip(self), fields(url = %self.config.url))]
    async fn login(&self) -> Result<String> {
        let credentials =
            PasswordLogin { username: &self.config.username, password: &self.config.password };
        let request = self
            .client
            .request(Method::POST, self.config.url.as_str())
            .header(ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&credentials);

        let reply: TokenResponse = send_login(self.name(), &self.config.url, request).await?;
        reply.token.ok_or_else(|| missing(self.name(), "token"))
    }
}
