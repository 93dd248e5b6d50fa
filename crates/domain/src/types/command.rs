//! Provisioning commands issued by partners

use serde::{Deserialize, Serialize};

use crate::constants::{CHANNEL_USSD, CHANNEL_WEB};
use crate::impl_domain_status_conversions;
use crate::{GatewayError, Result};

/// What a command asks the carrier to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Activate,
    Deactivate,
    Charge,
    WebActivate,
}

impl_domain_status_conversions!(CommandKind {
    Activate => "activate",
    Deactivate => "deactivate",
    Charge => "charge",
    WebActivate => "web_activate",
});

impl CommandKind {
    /// Path segment under `{base}/api/v1/`
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Charge => "charge",
            Self::WebActivate => "wapActivate",
        }
    }

    /// Channel recorded as the subscription `method`
    pub fn channel(self) -> &'static str {
        match self {
            Self::WebActivate => CHANNEL_WEB,
            Self::Activate | Self::Deactivate | Self::Charge => CHANNEL_USSD,
        }
    }

    pub fn is_charge(self) -> bool {
        matches!(self, Self::Charge)
    }
}

/// JSON body a partner submits for any command kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(rename = "requestId")]
    pub external_id: String,
    pub msisdn: String,
    #[serde(rename = "offerCode")]
    pub offer_code: String,
    #[serde(rename = "callBackUrl")]
    pub callback_url: String,
    #[serde(rename = "ChargeAmount", default, skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<String>,
}

/// A validated, immutable provisioning command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningCommand {
    pub external_id: String,
    pub msisdn: String,
    pub offer_code: String,
    /// Partner endpoint that receives relayed notifications
    pub callback_url: String,
    pub charge_amount: Option<String>,
    pub kind: CommandKind,
}

impl ProvisioningCommand {
    /// Build a command of `kind` from a partner request, validating it.
    ///
    /// # Errors
    /// Returns `GatewayError::InvalidInput` if a required field is blank or a
    /// charge has no amount.
    pub fn from_request(kind: CommandKind, request: CommandRequest) -> Result<Self> {
        let command = Self {
            external_id: request.external_id,
            msisdn: request.msisdn,
            offer_code: request.offer_code,
            callback_url: request.callback_url,
            charge_amount: request.charge_amount.filter(|amount| !amount.trim().is_empty()),
            kind,
        };
        command.validate()?;
        Ok(command)
    }

    /// Check the invariants the core relies on.
    ///
    /// # Errors
    /// Returns `GatewayError::InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("requestId", &self.external_id),
            ("msisdn", &self.msisdn),
            ("offerCode", &self.offer_code),
            ("callBackUrl", &self.callback_url),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::InvalidInput(format!("{field} is required")));
            }
        }

        if self.kind.is_charge() && self.charge_amount.is_none() {
            return Err(GatewayError::InvalidInput("ChargeAmount is required for charges".into()));
        }

        Ok(())
    }
}
