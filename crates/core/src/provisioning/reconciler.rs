//! Response and notification reconciliation
//!
//! Synchronous carrier replies are written straight onto the subscription or
//! transaction they concern. Asynchronous notifications are matched against
//! stored records, applied, and relayed verbatim to the partner's callback.
//! Notification failures are terminal to that notification and only logged
//! by the callers in `carrierlink-api`.

use std::sync::Arc;

use carrierlink_domain::constants::{
    FIELD_CLIENT_TRANSACTION_ID, FIELD_OFFER_CODE, FIELD_REASON, FIELD_SUBSCRIPTION_STATUS,
};
use carrierlink_domain::{
    GatewayError, InboundNotification, NewSubscription, NewTransaction, ProvisioningCommand,
    Result, StatusUpdate, SubscriptionRecord, SubscriptionState, TransactionRecord,
    UpstreamResponse,
};
use tracing::{info, instrument, warn};

use super::ports::{
    HttpExecutor, OutboundRequest, RequestHeaders, SubscriptionRepository, TransactionRepository,
};

/// What a synchronous reconciliation wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciledRecord {
    Subscription(SubscriptionRecord),
    Transaction(TransactionRecord),
}

/// Result of applying one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    /// Id of the updated subscription or transaction row
    pub record_id: i64,
    pub update: StatusUpdate,
    /// Whether the partner callback answered with a 2xx status
    pub relayed: bool,
}

pub struct ResponseReconciler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    transactions: Arc<dyn TransactionRepository>,
    relay: Arc<dyn HttpExecutor>,
}

impl ResponseReconciler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        transactions: Arc<dyn TransactionRepository>,
        relay: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self { subscriptions, transactions, relay }
    }

    /// Persist the outcome of a successful carrier call for `command`.
    ///
    /// # Errors
    ///
    /// `SubscriptionNotFound` for a charge on an unknown subscription, or a
    /// storage error.
    pub async fn reconcile(
        &self,
        command: &ProvisioningCommand,
        response: &UpstreamResponse,
    ) -> Result<ReconciledRecord> {
        if command.kind.is_charge() {
            self.record_charge(command, response).await.map(ReconciledRecord::Transaction)
        } else {
            self.record_subscription(command, response).await.map(ReconciledRecord::Subscription)
        }
    }

    /// Upsert the subscription for `(offer_code, msisdn)` from the reply body.
    #[instrument(skip_all, fields(external_id = %command.external_id, kind = %command.kind))]
    pub async fn record_subscription(
        &self,
        command: &ProvisioningCommand,
        response: &UpstreamResponse,
    ) -> Result<SubscriptionRecord> {
        let body = &response.envelope.body;
        let record = self
            .subscriptions
            .upsert(NewSubscription {
                external_id: command.external_id.clone(),
                plan_id: command.offer_code.clone(),
                msisdn: command.msisdn.clone(),
                method: command.kind.channel().to_string(),
                status: body.status.clone(),
                status_description: body.description.clone(),
                callback_url: command.callback_url.clone(),
            })
            .await?;

        info!(subscription_id = record.id, status = %record.status, "Subscription recorded");
        Ok(record)
    }

    /// Insert a transaction against the subscription for `(msisdn, offer_code)`.
    #[instrument(skip_all, fields(external_id = %command.external_id))]
    pub async fn record_charge(
        &self,
        command: &ProvisioningCommand,
        response: &UpstreamResponse,
    ) -> Result<TransactionRecord> {
        let subscription = self
            .subscriptions
            .find_by_plan_and_msisdn(&command.offer_code, &command.msisdn)
            .await?
            .ok_or_else(|| {
                warn!(msisdn = %command.msisdn, offer_code = %command.offer_code, "Charge for unknown subscription");
                GatewayError::SubscriptionNotFound {
                    msisdn: command.msisdn.clone(),
                    offer_code: command.offer_code.clone(),
                }
            })?;

        let body = &response.envelope.body;
        let record = self
            .transactions
            .insert(NewTransaction {
                external_id: command.external_id.clone(),
                subscription_id: subscription.id,
                status: body.status.clone(),
                status_description: body.description.clone(),
                amount: command.charge_amount.clone(),
                callback_url: command.callback_url.clone(),
            })
            .await?;

        info!(transaction_id = record.id, subscription_id = subscription.id, "Charge recorded");
        Ok(record)
    }

    /// Apply an activation/deactivation notification and relay it.
    ///
    /// # Errors
    ///
    /// `ReconciliationFailure` if a field is missing or no subscription
    /// matches; storage errors pass through.
    #[instrument(skip_all, fields(request_id = ?inbound.notification.request_id))]
    pub async fn apply_subscription_notification(
        &self,
        inbound: &InboundNotification,
    ) -> Result<NotificationOutcome> {
        let fields = &inbound.fields;
        let external_id = fields.require(FIELD_CLIENT_TRANSACTION_ID)?;
        let offer_code = fields.require(FIELD_OFFER_CODE)?;
        let state = SubscriptionState::from_notification_value(
            fields.require(FIELD_SUBSCRIPTION_STATUS)?,
        );

        let subscription = self
            .subscriptions
            .find_by_external_and_plan(external_id, offer_code)
            .await?
            .ok_or_else(|| {
                GatewayError::ReconciliationFailure(format!(
                    "no subscription for external id {external_id} on plan {offer_code}"
                ))
            })?;

        let update = StatusUpdate::from(state);
        self.subscriptions.update_status(subscription.id, update.clone()).await?;
        info!(subscription_id = subscription.id, status = %update.status, "Subscription status updated");

        let relayed = self.relay(&subscription.callback_url, inbound).await;
        Ok(NotificationOutcome { record_id: subscription.id, update, relayed })
    }

    /// Apply a charge-result notification and relay it.
    ///
    /// # Errors
    ///
    /// `ReconciliationFailure` if a field is missing or no transaction
    /// matches; storage errors pass through.
    #[instrument(skip_all, fields(request_id = ?inbound.notification.request_id))]
    pub async fn apply_charge_notification(
        &self,
        inbound: &InboundNotification,
    ) -> Result<NotificationOutcome> {
        let fields = &inbound.fields;
        let external_id = fields.require(FIELD_CLIENT_TRANSACTION_ID)?;
        let offer_code = fields.require(FIELD_OFFER_CODE)?;
        let update = StatusUpdate::from_charge_reason(fields.require(FIELD_REASON)?);

        let transaction = self
            .transactions
            .find_by_external_and_plan(external_id, offer_code)
            .await?
            .ok_or_else(|| {
                GatewayError::ReconciliationFailure(format!(
                    "no transaction for external id {external_id} on plan {offer_code}"
                ))
            })?;

        self.transactions.update_status(transaction.id, update.clone()).await?;
        info!(transaction_id = transaction.id, status = %update.status, "Transaction status updated");

        let relayed = self.relay(&transaction.callback_url, inbound).await;
        Ok(NotificationOutcome { record_id: transaction.id, update, relayed })
    }

    /// POST the notification as received to `callback_url`. Failures are
    /// logged and reported as `false`.
    async fn relay(&self, callback_url: &str, inbound: &InboundNotification) -> bool {
        let mut headers = RequestHeaders::new();
        headers.insert("Content-Type", "application/json");
        let request = OutboundRequest::post_json(callback_url, headers, inbound.raw.clone());

        match self.relay.execute(request).await {
            Ok(reply) => {
                info!(callback_url, status = reply.status, "Notification relayed to partner");
                true
            }
            Err(err) => {
                warn!(callback_url, error = %err, "Partner callback relay failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ResponseReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseReconciler").finish_non_exhaustive()
    }
}
