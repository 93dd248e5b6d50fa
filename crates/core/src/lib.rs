//! # CarrierLink Core
//!
//! Pure orchestration logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for HTTP, login and persistence
//! - Credential caching, header and payload composition
//! - Response and notification reconciliation
//!
//! ## Architecture Principles
//! - Depends only on `carrierlink-common` and `carrierlink-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod provisioning;

// Re-export specific items to avoid ambiguity
pub use provisioning::ports::{
    HttpExecutor, HttpMethod, HttpReply, LoginClient, OutboundRequest, RequestHeaders,
    SubscriptionRepository, TransactionRepository,
};
pub use provisioning::{
    CachedCredential, CredentialCache, HeaderBuilder, NotificationKind, NotificationOutcome,
    PayloadBuilder, ProvisioningService, ReconciledRecord, ResponseReconciler, SharedClock,
};
