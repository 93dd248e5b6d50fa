//! Outbound HTTP metrics
//!
//! ## Design
//! - **SeqCst ordering** for the counters and totals that feed averages
//! - **No locking needed** - simple atomic counters
//! - **Microsecond storage** - raw durations in µs, reporting helpers
//!   convert to ms

use std::sync::atomic::{AtomicU64, Ordering};

use crate::http::timing::RequestTiming;

/// Counters for every round trip made by a
/// [`TracedHttpExecutor`](crate::http::TracedHttpExecutor)
#[derive(Debug, Default)]
pub struct HttpMetrics {
    /// Requests attempted
    pub requests: AtomicU64,
    /// 2xx replies
    pub successes: AtomicU64,
    /// Replies with any other status
    pub rejections: AtomicU64,
    /// Requests that never produced a reply
    pub transport_failures: AtomicU64,
    /// Round trips with a timing sample
    pub timed_requests: AtomicU64,
    pub dns_micros: AtomicU64,
    pub connect_micros: AtomicU64,
    pub tls_micros: AtomicU64,
    pub ttfb_micros: AtomicU64,
    pub total_micros: AtomicU64,
}

/// Point-in-time copy of [`HttpMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HttpMetricsSnapshot {
    pub requests: u64,
    pub successes: u64,
    pub rejections: u64,
    pub transport_failures: u64,
    pub avg_dns_ms: f64,
    pub avg_connect_ms: f64,
    pub avg_tls_ms: f64,
    pub avg_ttfb_ms: f64,
    pub avg_total_ms: f64,
}

impl HttpMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Add one round trip's phase durations
    pub fn record_timing(&self, timing: &RequestTiming) {
        self.dns_micros.fetch_add(micros(timing.dns), Ordering::SeqCst);
        self.connect_micros.fetch_add(micros(timing.connect), Ordering::SeqCst);
        self.tls_micros.fetch_add(micros(timing.tls), Ordering::SeqCst);
        self.ttfb_micros.fetch_add(micros(timing.ttfb), Ordering::SeqCst);
        self.total_micros.fetch_add(micros(timing.total), Ordering::SeqCst);
        self.timed_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Average DNS time in milliseconds; 0.0 before any sample
    pub fn avg_dns_ms(&self) -> f64 {
        self.average_ms(&self.dns_micros)
    }

    pub fn avg_connect_ms(&self) -> f64 {
        self.average_ms(&self.connect_micros)
    }

    /// Average TLS handshake time; plain http and pooled connections count
    /// as zero
    pub fn avg_tls_ms(&self) -> f64 {
        self.average_ms(&self.tls_micros)
    }

    pub fn avg_ttfb_ms(&self) -> f64 {
        self.average_ms(&self.ttfb_micros)
    }

    pub fn avg_total_ms(&self) -> f64 {
        self.average_ms(&self.total_micros)
    }

    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            requests: self.requests.load(Ordering::SeqCst),
            successes: self.successes.load(Ordering::SeqCst),
            rejections: self.rejections.load(Ordering::SeqCst),
            transport_failures: self.transport_failures.load(Ordering::SeqCst),
            avg_dns_ms: self.avg_dns_ms(),
            avg_connect_ms: self.avg_connect_ms(),
            avg_tls_ms: self.avg_tls_ms(),
            avg_ttfb_ms: self.avg_ttfb_ms(),
            avg_total_ms: self.avg_total_ms(),
        }
    }

    fn average_ms(&self, total: &AtomicU64) -> f64 {
        let count = self.timed_requests.load(Ordering::SeqCst);
        if count == 0 {
            return 0.0;
        }
        (total.load(Ordering::SeqCst) as f64 / count as f64) / 1_000.0
    }
}

fn micros(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
