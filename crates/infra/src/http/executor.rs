//! Traced HTTP executor
//!
//! One round trip per call, no retries. Every call is logged with its phase
//! timings and counted in [`HttpMetrics`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use carrierlink_core::{HttpExecutor, HttpMethod, HttpReply, OutboundRequest};
use carrierlink_domain::{GatewayError, HttpConfig, Result};
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::timing::{record_phases, PhaseRecorder};
use crate::errors::to_gateway;
use crate::observability::HttpMetrics;

/// reqwest-backed [`HttpExecutor`]
#[derive(Debug, Clone)]
pub struct TracedHttpExecutor {
    client: HttpClient,
    metrics: Arc<HttpMetrics>,
}

impl TracedHttpExecutor {
    pub fn new(client: HttpClient) -> Self {
        Self { client, metrics: Arc::new(HttpMetrics::new()) }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::from_config(config)?))
    }

    pub fn metrics(&self) -> Arc<HttpMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Send `request`; returns status, body and time until headers arrived.
    async fn round_trip(
        &self,
        request: &OutboundRequest,
        started: Instant,
    ) -> reqwest::Result<(u16, String, Duration)> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let to_headers = started.elapsed();
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body, to_headers))
    }
}

#[async_trait]
impl HttpExecutor for TracedHttpExecutor {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: OutboundRequest) -> Result<HttpReply> {
        self.metrics.record_request();
        debug!(body = request.body.as_deref().unwrap_or(""), "Sending HTTP request");

        let recorder = Arc::new(PhaseRecorder::default());
        let started = Instant::now();
        let outcome = record_phases(Arc::clone(&recorder), self.round_trip(&request, started)).await;

        let (status, body, to_headers) = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                self.metrics.record_transport_failure();
                let err = match to_gateway(err) {
                    GatewayError::UpstreamRejected { status, body } => {
                        GatewayError::UpstreamUnreachable(format!("HTTP {status} {body}"))
                    }
                    other => other,
                };
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "HTTP request failed"
                );
                return Err(err);
            }
        };

        let timing = recorder.finish(to_headers, started.elapsed());
        self.metrics.record_timing(&timing);
        info!(
            status,
            dns_ms = timing.dns.as_millis() as u64,
            connect_ms = timing.connect.as_millis() as u64,
            tls_ms = timing.tls.as_millis() as u64,
            ttfb_ms = timing.ttfb.as_millis() as u64,
            total_ms = timing.total.as_millis() as u64,
            "HTTP round trip"
        );
        debug!(status, body = %body, "Received HTTP response");

        if (200..300).contains(&status) {
            self.metrics.record_success();
            Ok(HttpReply { status, body })
        } else {
            self.metrics.record_rejection();
            Err(GatewayError::UpstreamRejected { status, body })
        }
    }
}
