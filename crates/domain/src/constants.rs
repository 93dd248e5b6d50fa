//! Gateway constants
//!
//! Wire-level literals shared by the builder, the reconciler and tests.

// Credential cache
pub const DEFAULT_CREDENTIAL_TTL_SECS: u64 = 50 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const CARRIER_TOKEN_KEY: &str = "carrier-token";
pub const GATEWAY_TOKEN_KEY: &str = "gateway-token";

// Persistence
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Notification field names
pub const FIELD_CLIENT_TRANSACTION_ID: &str = "ClientTransactionId";
pub const FIELD_OFFER_CODE: &str = "OfferCode";
pub const FIELD_SUBSCRIPTION_STATUS: &str = "SubscriptionStatus";
pub const FIELD_REASON: &str = "Reason";

// Status vocabulary
pub const STATUS_ACTIVE: &str = "A";
pub const STATUS_DEACTIVE: &str = "D";
pub const DESCRIPTION_ACTIVE: &str = "Subscriber in active state";
pub const DESCRIPTION_DEACTIVE: &str = "Subscriber in Deactive state";
pub const CHARGE_REASON_SUCCESSFUL: &str = "Successful";
pub const DESCRIPTION_CHARGED: &str = "Subscriber charged";

// Channels recorded on subscriptions
pub const CHANNEL_USSD: &str = "USSD";
pub const CHANNEL_WEB: &str = "WEB";

// Static upstream headers
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_SECONDARY_AUTH: &str = "X-api-auth-token";
pub const HEADER_API_KEY: &str = "X-Api-Key";
pub const HEADER_CONVERSATION_ID: &str = "X-Correlation-Conversation-ID";
pub const HEADER_MESSAGE_ID: &str = "X-MessageID";
pub const HEADER_SOURCE_TIMESTAMP: &str = "X-Source-Timestamp";
pub const STATIC_UPSTREAM_HEADERS: [(&str, &str); 9] = [
    ("Accept-Encoding", "application/json"),
    ("Accept-Language", "EN"),
    ("Content-Type", "application/json"),
    ("X-App", "ussd"),
    ("X-Source-Division", "DIT"),
    ("X-Source-CountryCode", "KE"),
    ("X-Source-Operator", "Safaricom"),
    ("X-Source-System", "web-portal"),
    ("X-Version", "1.0.0"),
];
