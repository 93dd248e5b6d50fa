//! Outbound request orchestration
//!
//! Leaf to root: cached credentials, header and payload builders, the
//! reconciler, and the service tying them to an [`ports::HttpExecutor`].

pub mod credentials;
pub mod headers;
pub mod payload;
pub mod ports;
pub mod reconciler;
pub mod service;

pub use credentials::{CachedCredential, CredentialCache, SharedClock};
pub use headers::HeaderBuilder;
pub use payload::{PayloadBuilder, UpstreamPayload};
pub use reconciler::{NotificationOutcome, ReconciledRecord, ResponseReconciler};
pub use service::{NotificationKind, ProvisioningService};
