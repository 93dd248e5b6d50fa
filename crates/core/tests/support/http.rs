//! Scripted HTTP executor and login fakes

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use carrierlink_core::{HttpExecutor, HttpReply, LoginClient, OutboundRequest};
use carrierlink_domain::{GatewayError, Result};

/// Replies queued per URL; unscripted URLs answer `200 {}`.
#[derive(Default)]
pub struct ScriptedExecutor {
    replies: Mutex<HashMap<String, VecDeque<Result<HttpReply>>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedExecutor {
    pub fn reply(&self, url: &str, status: u16, body: impl Into<String>) {
        let body = body.into();
        let outcome = if (200..300).contains(&status) {
            Ok(HttpReply { status, body })
        } else {
            Err(GatewayError::UpstreamRejected { status, body })
        };
        self.push(url, outcome);
    }

    pub fn fail(&self, url: &str, error: GatewayError) {
        self.push(url, Err(error));
    }

    fn push(&self, url: &str, outcome: Result<HttpReply>) {
        self.replies.lock().unwrap().entry(url.to_string()).or_default().push_back(outcome);
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<OutboundRequest> {
        self.requests().into_iter().filter(|request| request.url == url).collect()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: OutboundRequest) -> Result<HttpReply> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(HttpReply { status: 200, body: "{}".into() }))
    }
}

/// Login client returning a fixed token or failing
pub struct FakeLogin {
    name: &'static str,
    token: Option<String>,
    calls: AtomicUsize,
}

impl FakeLogin {
    pub fn ok(name: &'static str, token: &str) -> Arc<Self> {
        Arc::new(Self { name, token: Some(token.into()), calls: AtomicUsize::new(0) })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name, token: None, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginClient for FakeLogin {
    fn name(&self) -> &str {
        self.name
    }

    async fn login(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone().ok_or_else(|| GatewayError::UpstreamRejected {
            status: 401,
            body: "invalid credentials".into(),
        })
    }
}
