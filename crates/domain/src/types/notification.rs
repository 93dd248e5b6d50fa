//! Inbound asynchronous notifications from the carrier

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::upstream::NamedField;
use crate::{GatewayError, Result};

/// `requestParam` wrapper used by the carrier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParam {
    #[serde(default)]
    pub data: Vec<NamedField>,
}

/// Notification document as posted by the carrier.
///
/// The carrier nests the fields under `requestParam.data`; some senders post a
/// flattened top-level `data` array. Both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub request_param: Option<RequestParam>,
    #[serde(default)]
    pub data: Option<Vec<NamedField>>,
}

impl Notification {
    /// All named fields, nested ones first
    pub fn fields(&self) -> impl Iterator<Item = &NamedField> {
        self.request_param
            .iter()
            .flat_map(|param| param.data.iter())
            .chain(self.data.iter().flatten())
    }

    pub fn field_map(&self) -> NotificationFields {
        NotificationFields::from_fields(self.fields())
    }
}

/// Name to text lookup built once per notification. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFields {
    values: HashMap<String, String>,
}

impl NotificationFields {
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a NamedField>) -> Self {
        let values = fields.into_iter().map(|field| (field.name.clone(), field.value_text())).collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Look up a field that must be present.
    ///
    /// # Errors
    /// Returns `GatewayError::ReconciliationFailure` naming the missing field.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| {
            GatewayError::ReconciliationFailure(format!("notification is missing field {name}"))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parsed notification together with the exact document received, which
/// is what gets relayed to the partner.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundNotification {
    pub notification: Notification,
    pub fields: NotificationFields,
    pub payload: Value,
    /// Body text as received
    pub raw: String,
}

impl InboundNotification {
    /// Parse a raw notification body.
    ///
    /// # Errors
    /// Returns `GatewayError::ReconciliationFailure` if the body is not JSON or
    /// does not have the notification shape.
    pub fn from_json(raw: &str) -> Result<Self> {
        let payload: Value = serde_json::from_str(raw).map_err(|err| {
            GatewayError::ReconciliationFailure(format!("notification is not valid JSON: {err}"))
        })?;
        Self::build(payload, raw.to_string())
    }

    /// Parse an already decoded notification; the relay body is its JSON text.
    ///
    /// # Errors
    /// Returns `GatewayError::ReconciliationFailure` on shape mismatch.
    pub fn from_value(payload: Value) -> Result<Self> {
        let raw = payload.to_string();
        Self::build(payload, raw)
    }

    fn build(payload: Value, raw: String) -> Result<Self> {
        let notification: Notification = serde_json::from_value(payload.clone()).map_err(|err| {
            GatewayError::ReconciliationFailure(format!("unexpected notification shape: {err}"))
        })?;
        let fields = notification.field_map();
        Ok(Self { notification, fields, payload, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FIELD_CLIENT_TRANSACTION_ID, FIELD_OFFER_CODE, FIELD_SUBSCRIPTION_STATUS};

    const NESTED: &str = r#"{
        "requestId": "n-1",
        "requestParam": {
            "data": [
                {"name": "OfferCode", "value": "P1"},
                {"name": "ClientTransactionId", "value": "ext-1"},
                {"name": "SubscriptionStatus", "value": "A"}
            ]
        }
    }"#;

    #[test]
    fn nested_fields_are_mapped_by_name() {
        let inbound = InboundNotification::from_json(NESTED).unwrap();
        assert_eq!(inbound.notification.request_id.as_deref(), Some("n-1"));
        assert_eq!(inbound.fields.get(FIELD_OFFER_CODE), Some("P1"));
        assert_eq!(inbound.fields.get(FIELD_CLIENT_TRANSACTION_ID), Some("ext-1"));
        assert_eq!(inbound.fields.get(FIELD_SUBSCRIPTION_STATUS), Some("A"));
        assert_eq!(inbound.fields.len(), 3);
    }

    #[test]
    fn flattened_data_is_accepted() {
        let raw = r#"{"requestId": "n-2", "data": [{"name": "Reason", "value": "Successful"}]}"#;
        let inbound = InboundNotification::from_json(raw).unwrap();
        assert_eq!(inbound.fields.get("Reason"), Some("Successful"));
    }

    #[test]
    fn payload_is_kept_verbatim() {
        let inbound = InboundNotification::from_json(NESTED).unwrap();
        let original: Value = serde_json::from_str(NESTED).unwrap();
        assert_eq!(inbound.payload, original);
        assert_eq!(inbound.raw, NESTED);
    }

    #[test]
    fn non_string_values_use_json_text() {
        let raw = r#"{"data": [{"name": "ClientTransactionId", "value": 42}, {"name": "Flag", "value": true}]}"#;
        let inbound = InboundNotification::from_json(raw).unwrap();
        assert_eq!(inbound.fields.get("ClientTransactionId"), Some("42"));
        assert_eq!(inbound.fields.get("Flag"), Some("true"));
    }

    #[test]
    fn missing_required_field_is_a_reconciliation_failure() {
        let inbound = InboundNotification::from_json(r#"{"data": []}"#).unwrap();
        let err = inbound.fields.require(FIELD_OFFER_CODE).unwrap_err();
        assert!(matches!(err, GatewayError::ReconciliationFailure(msg) if msg.contains("OfferCode")));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = InboundNotification::from_json("not json").unwrap_err();
        assert!(matches!(err, GatewayError::ReconciliationFailure(_)));
    }
}
