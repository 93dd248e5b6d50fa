//! Carrier API response envelope

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{GatewayError, Result};

/// A `{name, value}` pair as used in carrier payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedField {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl NamedField {
    /// Render the value as text: strings verbatim, other scalars as JSON.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// `header` section of a carrier response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamHeader {
    #[serde(default)]
    pub request_ref_id: String,
    #[serde(default)]
    pub response_code: Value,
    #[serde(default)]
    pub response_message: String,
    #[serde(default)]
    pub customer_message: String,
    #[serde(default)]
    pub timestamp: String,
}

/// `body` section of a carrier response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamBody {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub status_code: String,
    #[serde(default)]
    pub data: Vec<NamedField>,
}

/// Full carrier response document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamEnvelope {
    #[serde(default)]
    pub header: UpstreamHeader,
    pub body: UpstreamBody,
}

/// One upstream reply: HTTP status, parsed envelope and the raw text
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status_code: u16,
    pub envelope: UpstreamEnvelope,
    pub raw_body: String,
}

impl UpstreamResponse {
    /// Parse a raw carrier reply.
    ///
    /// # Errors
    /// Returns `GatewayError::MalformedResponse` carrying the raw body when the
    /// document is not valid JSON or has no `body` object. A missing
    /// `body.status` parses as an empty status.
    pub fn parse(status_code: u16, raw_body: impl Into<String>) -> Result<Self> {
        let raw_body = raw_body.into();
        let envelope: UpstreamEnvelope = serde_json::from_str(&raw_body).map_err(|err| {
            GatewayError::MalformedResponse { reason: err.to_string(), body: raw_body.clone() }
        })?;
        Ok(Self { status_code, envelope, raw_body })
    }

    /// `body.status` as reported by the carrier
    pub fn status(&self) -> &str {
        &self.envelope.body.status
    }

    /// `body.description` as reported by the carrier
    pub fn description_text(&self) -> &str {
        &self.envelope.body.description
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
