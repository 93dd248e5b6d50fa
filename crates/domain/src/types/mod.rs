//! Domain types and models

pub mod command;
pub mod notification;
pub mod records;
pub mod upstream;

pub use command::{CommandKind, CommandRequest, ProvisioningCommand};
pub use notification::{InboundNotification, Notification, NotificationFields, RequestParam};
pub use records::{
    NewSubscription, NewTransaction, StatusUpdate, SubscriptionRecord, SubscriptionState,
    TransactionRecord,
};
pub use upstream::{NamedField, UpstreamBody, UpstreamEnvelope, UpstreamHeader, UpstreamResponse};
