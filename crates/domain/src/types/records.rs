//! Durable subscription and transaction records
//!
//! These types mirror the `subscriptions` and `transactions` tables and are
//! used by the repository ports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CHARGE_REASON_SUCCESSFUL, DESCRIPTION_ACTIVE, DESCRIPTION_CHARGED, DESCRIPTION_DEACTIVE,
    STATUS_ACTIVE, STATUS_DEACTIVE,
};

/// Stored subscription row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub external_id: String,
    /// Carrier offer code
    pub plan_id: String,
    pub msisdn: String,
    /// Channel the subscription came through (`USSD` or `WEB`)
    pub method: String,
    pub status: String,
    pub status_description: String,
    pub callback_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by a subscription upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub external_id: String,
    pub plan_id: String,
    pub msisdn: String,
    pub method: String,
    pub status: String,
    pub status_description: String,
    pub callback_url: String,
}

/// Stored charge transaction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub external_id: String,
    pub subscription_id: i64,
    pub status: String,
    pub status_description: String,
    pub amount: Option<String>,
    pub callback_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub external_id: String,
    pub subscription_id: i64,
    pub status: String,
    pub status_description: String,
    pub amount: Option<String>,
    pub callback_url: String,
}

/// New status pair applied by a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    pub status_description: String,
}

impl StatusUpdate {
    /// Status for a charge-result notification: the raw reason is stored as
    /// the status, with a fixed description on success.
    pub fn from_charge_reason(reason: &str) -> Self {
        let status_description = if reason == CHARGE_REASON_SUCCESSFUL {
            DESCRIPTION_CHARGED.to_string()
        } else {
            reason.to_string()
        };
        Self { status: reason.to_string(), status_description }
    }
}

/// Subscription state reported by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionState {
    Active,
    Deactive,
}

impl SubscriptionState {
    /// `"A"` is active; every other value counts as deactivated.
    pub fn from_notification_value(value: &str) -> Self {
        if value == STATUS_ACTIVE {
            Self::Active
        } else {
            Self::Deactive
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Deactive => STATUS_DEACTIVE,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Active => DESCRIPTION_ACTIVE,
            Self::Deactive => DESCRIPTION_DEACTIVE,
        }
    }
}

impl From<SubscriptionState> for StatusUpdate {
    fn from(state: SubscriptionState) -> Self {
        Self { status: state.code().to_string(), status_description: state.description().to_string() }
    }
}
