use std::sync::Arc;
use std::time::Duration;

use carrierlink_domain::{HttpConfig, Result};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder};

use super::timing::{ConnectTimingLayer, TimedResolver};
use super::tls;
use crate::errors::to_gateway;

/// Shared reqwest client with the phase-timing hooks installed.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the `http` config section.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Self::builder().accept_invalid_certs(config.accept_invalid_certs);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl HttpClientBuilder {
    /// Whole-request timeout. Unset means the transport default (none).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Skip TLS certificate validation. Only for upstreams with self-signed
    /// certificates.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        if self.accept_invalid_certs {
            tracing::warn!("TLS certificate validation disabled for outbound calls");
        }

        let mut builder = ReqwestClient::builder()
            .no_proxy()
            .use_preconfigured_tls(tls::client_config(self.accept_invalid_certs)?)
            .dns_resolver(Arc::new(TimedResolver))
            .connector_layer(ConnectTimingLayer);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(to_gateway)?;
        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "carrierlink-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::builder().user_agent("carrierlink-test").build().unwrap();
        let response = client.request(Method::GET, server.uri()).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = HttpConfig { timeout_seconds: None, ..HttpConfig::default() };
        assert!(HttpClient::from_config(&config).is_ok());

        let client = HttpClient::builder().timeout(Duration::from_millis(50)).build().unwrap();
        let err = client.request(Method::GET, server.uri()).send().await.unwrap_err();
        assert!(err.is_timeout());
    }
}
