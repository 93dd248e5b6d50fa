//! Provisioning service - command orchestration
//!
//! command -> headers (cached credentials) -> carrier call -> reconcile

use std::sync::Arc;

use carrierlink_domain::{
    GatewayError, InboundNotification, ProvisioningCommand, Result, UpstreamResponse,
};
use tracing::{error, info, instrument, warn};

use super::headers::HeaderBuilder;
use super::payload::PayloadBuilder;
use super::ports::{HttpExecutor, OutboundRequest};
use super::reconciler::{NotificationOutcome, ResponseReconciler};

/// Which notification endpoint a payload arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Subscription,
    Charge,
}

/// Drives provisioning commands and notifications through the core
pub struct ProvisioningService {
    headers: HeaderBuilder,
    payloads: PayloadBuilder,
    executor: Arc<dyn HttpExecutor>,
    reconciler: ResponseReconciler,
}

impl ProvisioningService {
    pub fn new(
        headers: HeaderBuilder,
        payloads: PayloadBuilder,
        executor: Arc<dyn HttpExecutor>,
        reconciler: ResponseReconciler,
    ) -> Self {
        Self { headers, payloads, executor, reconciler }
    }

    /// Send `command` to the carrier and persist the reply.
    ///
    /// Returns the parsed carrier envelope on success. Nothing is persisted
    /// when the call fails or the reply cannot be parsed.
    ///
    /// # Errors
    ///
    /// `InvalidInput`, `CredentialUnavailable`, `UpstreamRejected`,
    /// `UpstreamUnreachable`, `MalformedResponse`, `SubscriptionNotFound` or
    /// a storage error.
    #[instrument(skip(self, command), fields(external_id = %command.external_id, kind = %command.kind))]
    pub async fn execute(&self, command: ProvisioningCommand) -> Result<UpstreamResponse> {
        command.validate()?;

        let headers = self.headers.build_headers(&command.external_id).await?;
        let payload = self.payloads.build(&command);
        let body = serde_json::to_string(&payload)
            .map_err(|e| GatewayError::Internal(format!("failed to encode payload: {e}")))?;
        let url = self.payloads.endpoint_url(command.kind);

        let reply = self.executor.execute(OutboundRequest::post_json(url, headers, body)).await?;

        let response = UpstreamResponse::parse(reply.status, reply.body).map_err(|err| {
            if let GatewayError::MalformedResponse { reason, body } = &err {
                error!(%reason, raw_body = %body, "Carrier reply could not be parsed");
            }
            err
        })?;

        self.reconciler.reconcile(&command, &response).await?;

        info!(status = %response.status(), "Command completed");
        Ok(response)
    }

    /// Parse and apply one notification. Errors are logged, never returned.
    #[instrument(skip(self, raw))]
    pub async fn handle_notification(
        &self,
        kind: NotificationKind,
        raw: &str,
    ) -> Option<NotificationOutcome> {
        let result = match InboundNotification::from_json(raw) {
            Ok(inbound) => match kind {
                NotificationKind::Subscription => {
                    self.reconciler.apply_subscription_notification(&inbound).await
                }
                NotificationKind::Charge => self.reconciler.apply_charge_notification(&inbound).await,
            },
            Err(err) => Err(err),
        };

        match result {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(error = %err, category = ?err.category(), "Notification dropped");
                None
            }
        }
    }

    pub fn reconciler(&self) -> &ResponseReconciler {
        &self.reconciler
    }
}
