//! Carrier request bodies and endpoint URLs

use carrierlink_domain::{CommandKind, ProvisioningCommand, UpstreamConfig};
use serde::Serialize;

/// JSON body posted to the carrier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamPayload {
    pub msisdn: String,
    #[serde(rename = "offerCode")]
    pub offer_code: String,
    #[serde(rename = "CpId")]
    pub cp_id: String,
    /// The gateway's own notification endpoint, never the partner's
    #[serde(rename = "callBackUrl")]
    pub callback_url: String,
    #[serde(rename = "ChargeAmount", skip_serializing_if = "Option::is_none")]
    pub charge_amount: Option<String>,
}

/// Maps commands onto carrier URLs and bodies
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    base_url: String,
    cp_id: String,
    subscription_callback: String,
    charge_callback: String,
}

impl PayloadBuilder {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cp_id: config.cp_id.clone(),
            subscription_callback: config.subscription_notification_url.clone(),
            charge_callback: config.charge_notification_url.clone(),
        }
    }

    /// `{base}/api/v1/{operation}` for `kind`
    pub fn endpoint_url(&self, kind: CommandKind) -> String {
        format!("{}/api/v1/{}", self.base_url, kind.endpoint())
    }

    pub fn build(&self, command: &ProvisioningCommand) -> UpstreamPayload {
        let (callback_url, charge_amount) = if command.kind.is_charge() {
            (self.charge_callback.clone(), command.charge_amount.clone())
        } else {
            (self.subscription_callback.clone(), None)
        };

        UpstreamPayload {
            msisdn: command.msisdn.clone(),
            offer_code: command.offer_code.clone(),
            cp_id: self.cp_id.clone(),
            callback_url,
            charge_amount,
        }
    }
}
