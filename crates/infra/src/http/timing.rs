//! Per-request phase timing
//!
//! Three hooks sit below the request future: the DNS resolver, the connector
//! stack and the rustls session store. All run on the task that issued the
//! request, so each request installs a [`PhaseRecorder`] in a task-local and
//! the hooks report to it. rustls consults its session store while building
//! the ClientHello, which marks the end of TCP connect and the start of the
//! handshake; the handshake ends when the connector returns. Pooled
//! connections skip every hook and report zero.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use rustls::client::{ClientSessionStore, Tls12ClientSessionValue, Tls13ClientSessionValue};
use rustls::pki_types::ServerName;
use rustls::NamedGroup;
use tower::{Layer, Service};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

tokio::task_local! {
    static PHASES: Arc<PhaseRecorder>;
}

/// Durations observed for one round trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestTiming {
    pub dns: Duration,
    /// TCP connect
    pub connect: Duration,
    /// TLS handshake; zero for plain http
    pub tls: Duration,
    /// From connection ready to response headers
    pub ttfb: Duration,
    /// Whole round trip including the body read
    pub total: Duration,
}

/// Collects hook durations for the request running on the current task
#[derive(Debug, Default)]
pub struct PhaseRecorder {
    dns_micros: AtomicU64,
    connector_micros: AtomicU64,
    tls_micros: AtomicU64,
    handshake_started: Mutex<Option<Instant>>,
}

impl PhaseRecorder {
    fn add_dns(&self, elapsed: Duration) {
        self.dns_micros.fetch_add(as_micros(elapsed), Ordering::Relaxed);
    }

    fn add_connector(&self, elapsed: Duration) {
        self.connector_micros.fetch_add(as_micros(elapsed), Ordering::Relaxed);
    }

    fn add_tls(&self, elapsed: Duration) {
        self.tls_micros.fetch_add(as_micros(elapsed), Ordering::Relaxed);
    }

    /// Keeps the first mark; a HelloRetryRequest consults the store again.
    fn mark_handshake_start(&self) {
        if let Ok(mut started) = self.handshake_started.lock() {
            started.get_or_insert_with(Instant::now);
        }
    }

    fn end_handshake(&self) {
        let started = self.handshake_started.lock().ok().and_then(|mut started| started.take());
        if let Some(started) = started {
            self.add_tls(started.elapsed());
        }
    }

    pub fn dns(&self) -> Duration {
        Duration::from_micros(self.dns_micros.load(Ordering::Relaxed))
    }

    pub fn tls(&self) -> Duration {
        Duration::from_micros(self.tls_micros.load(Ordering::Relaxed))
    }

    /// Connector time minus the resolver and handshake time nested inside it
    pub fn connect(&self) -> Duration {
        let connector = Duration::from_micros(self.connector_micros.load(Ordering::Relaxed));
        connector.saturating_sub(self.dns() + self.tls())
    }

    /// Assemble the timing for a request whose headers arrived after
    /// `to_headers` and whose body was read after `total`.
    pub fn finish(&self, to_headers: Duration, total: Duration) -> RequestTiming {
        let dns = self.dns();
        let connect = self.connect();
        let tls = self.tls();
        let ttfb = to_headers.saturating_sub(dns + connect + tls);
        RequestTiming { dns, connect, tls, ttfb, total }
    }
}

/// Run `future` with `recorder` receiving the phase durations it produces.
pub async fn record_phases<F: Future>(recorder: Arc<PhaseRecorder>, future: F) -> F::Output {
    PHASES.scope(recorder, future).await
}

fn with_recorder(f: impl FnOnce(&PhaseRecorder)) {
    // Connections finished by a background task have no recorder in scope.
    let _ = PHASES.try_with(|recorder| f(recorder));
}

fn as_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// System resolver that reports lookup time
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedResolver;

impl Resolve for TimedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let started = Instant::now();
            let host = name.as_str().to_string();
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0)).await?.collect();
            let elapsed = started.elapsed();
            with_recorder(|recorder| recorder.add_dns(elapsed));
            tracing::trace!(%host, addresses = addrs.len(), elapsed_us = as_micros(elapsed), "DNS resolved");
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

/// Connector layer that reports how long establishing a connection took
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectTimingLayer;

impl<S> Layer<S> for ConnectTimingLayer {
    type Service = ConnectTiming<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConnectTiming { inner }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectTiming<S> {
    inner: S,
}

impl<S, R> Service<R> for ConnectTiming<S>
where
    S: Service<R>,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        let connecting = self.inner.call(request);
        Box::pin(async move {
            let started = Instant::now();
            let result = connecting.await;
            let elapsed = started.elapsed();
            with_recorder(|recorder| {
                recorder.end_handshake();
                recorder.add_connector(elapsed);
            });
            result
        })
    }
}

/// rustls session store that marks the start of the TLS handshake
#[derive(Debug)]
pub struct HandshakeTimingStore {
    inner: Arc<dyn ClientSessionStore>,
}

impl HandshakeTimingStore {
    pub fn new(inner: Arc<dyn ClientSessionStore>) -> Self {
        Self { inner }
    }
}

fn mark_handshake() {
    with_recorder(PhaseRecorder::mark_handshake_start);
}

impl ClientSessionStore for HandshakeTimingStore {
    fn set_kx_hint(&self, server_name: ServerName<'static>, group: NamedGroup) {
        self.inner.set_kx_hint(server_name, group);
    }

    fn kx_hint(&self, server_name: &ServerName<'_>) -> Option<NamedGroup> {
        mark_handshake();
        self.inner.kx_hint(server_name)
    }

    fn set_tls12_session(&self, server_name: ServerName<'static>, value: Tls12ClientSessionValue) {
        self.inner.set_tls12_session(server_name, value);
    }

    fn tls12_session(&self, server_name: &ServerName<'_>) -> Option<Tls12ClientSessionValue> {
        mark_handshake();
        self.inner.tls12_session(server_name)
    }

    fn remove_tls12_session(&self, server_name: &ServerName<'static>) {
        self.inner.remove_tls12_session(server_name);
    }

    fn insert_tls13_ticket(&self, server_name: ServerName<'static>, value: Tls13ClientSessionValue) {
        self.inner.insert_tls13_ticket(server_name, value);
    }

    fn take_tls13_ticket(&self, server_name: &ServerName<'static>) -> Option<Tls13ClientSessionValue> {
        mark_handshake();
        self.inner.take_tls13_ticket(server_name)
    }
}
