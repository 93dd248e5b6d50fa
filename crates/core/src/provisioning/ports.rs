//! Port interfaces for outbound provisioning
//!
//! These traits define the boundaries between the orchestration logic and
//! the HTTP, login and persistence implementations in `carrierlink-infra`.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use carrierlink_domain::{
    NewSubscription, NewTransaction, Result, StatusUpdate, SubscriptionRecord, TransactionRecord,
};

/// Obtains a fresh bearer token from one upstream identity provider
#[async_trait]
pub trait LoginClient: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Perform one login round trip and return the raw token
    async fn login(&self) -> Result<String>;
}

/// HTTP verbs the gateway issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Ordered header set for one outbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders(BTreeMap<String, String>);

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fully composed request handed to the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: RequestHeaders,
    pub body: Option<String>,
}

impl OutboundRequest {
    /// JSON POST with the given headers
    pub fn post_json(url: impl Into<String>, headers: RequestHeaders, body: String) -> Self {
        Self { method: HttpMethod::Post, url: url.into(), headers, body: Some(body) }
    }
}

/// A 2xx reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Performs one HTTP round trip.
///
/// Implementations never retry. Non-2xx statuses surface as
/// `GatewayError::UpstreamRejected`, transport failures as
/// `GatewayError::UpstreamUnreachable`.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> Result<HttpReply>;
}

/// Durable subscription storage
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert or update the row for `(plan_id, msisdn)` in one statement
    async fn upsert(&self, subscription: NewSubscription) -> Result<SubscriptionRecord>;

    async fn find_by_plan_and_msisdn(
        &self,
        plan_id: &str,
        msisdn: &str,
    ) -> Result<Option<SubscriptionRecord>>;

    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> Result<Option<SubscriptionRecord>>;

    async fn update_status(&self, id: i64, update: StatusUpdate) -> Result<()>;
}

/// Durable charge transaction storage
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, transaction: NewTransaction) -> Result<TransactionRecord>;

    /// Find the transaction with `external_id` whose subscription is on
    /// `plan_id`
    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> Result<Option<TransactionRecord>>;

    async fn update_status(&self, id: i64, update: StatusUpdate) -> Result<()>;
}
