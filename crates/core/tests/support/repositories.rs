//! In-memory repository implementations for testing
//!
//! Mirrors the SQLite semantics: the subscription upsert is keyed by
//! `(plan_id, msisdn)` and transactions resolve their plan through the
//! subscription they reference.

use std::sync::Mutex;

use async_trait::async_trait;
use carrierlink_core::{SubscriptionRepository, TransactionRepository};
use carrierlink_domain::{
    NewSubscription, NewTransaction, Result, StatusUpdate, SubscriptionRecord, TransactionRecord,
};
use chrono::Utc;

#[derive(Default)]
pub struct InMemoryStore {
    subscriptions: Mutex<Vec<SubscriptionRecord>>,
    transactions: Mutex<Vec<TransactionRecord>>,
}

impl InMemoryStore {
    pub fn subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.transactions.lock().unwrap().clone()
    }

    pub fn seed_subscription(&self, external_id: &str, plan_id: &str, msisdn: &str) -> i64 {
        let mut rows = self.subscriptions.lock().unwrap();
        let id = rows.len() as i64 + 1;
        let now = Utc::now();
        rows.push(SubscriptionRecord {
            id,
            external_id: external_id.into(),
            plan_id: plan_id.into(),
            msisdn: msisdn.into(),
            method: "USSD".into(),
            status: "Pending".into(),
            status_description: "seeded".into(),
            callback_url: super::PARTNER_CALLBACK.into(),
            created_at: now,
            updated_at: now,
        });
        id
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn upsert(&self, new: NewSubscription) -> Result<SubscriptionRecord> {
        let mut rows = self.subscriptions.lock().unwrap();
        let now = Utc::now();
        if let Some(row) =
            rows.iter_mut().find(|row| row.plan_id == new.plan_id && row.msisdn == new.msisdn)
        {
            row.external_id = new.external_id;
            row.method = new.method;
            row.status = new.status;
            row.status_description = new.status_description;
            row.callback_url = new.callback_url;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let record = SubscriptionRecord {
            id: rows.len() as i64 + 1,
            external_id: new.external_id,
            plan_id: new.plan_id,
            msisdn: new.msisdn,
            method: new.method,
            status: new.status,
            status_description: new.status_description,
            callback_url: new.callback_url,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_plan_and_msisdn(
        &self,
        plan_id: &str,
        msisdn: &str,
    ) -> Result<Option<SubscriptionRecord>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.plan_id == plan_id && row.msisdn == msisdn)
            .cloned())
    }

    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> Result<Option<SubscriptionRecord>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.external_id == external_id && row.plan_id == plan_id)
            .cloned())
    }

    async fn update_status(&self, id: i64, update: StatusUpdate) -> Result<()> {
        if let Some(row) = self.subscriptions.lock().unwrap().iter_mut().find(|row| row.id == id) {
            row.status = update.status;
            row.status_description = update.status_description;
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryStore {
    async fn insert(&self, new: NewTransaction) -> Result<TransactionRecord> {
        let mut rows = self.transactions.lock().unwrap();
        let now = Utc::now();
        let record = TransactionRecord {
            id: rows.len() as i64 + 1,
            external_id: new.external_id,
            subscription_id: new.subscription_id,
            status: new.status,
            status_description: new.status_description,
            amount: new.amount,
            callback_url: new.callback_url,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> Result<Option<TransactionRecord>> {
        let subscriptions = self.subscriptions.lock().unwrap();
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .find(|tx| {
                tx.external_id == external_id
                    && subscriptions
                        .iter()
                        .any(|sub| sub.id == tx.subscription_id && sub.plan_id == plan_id)
            })
            .cloned())
    }

    async fn update_status(&self, id: i64, update: StatusUpdate) -> Result<()> {
        if let Some(row) = self.transactions.lock().unwrap().iter_mut().find(|row| row.id == id) {
            row.status = update.status;
            row.status_description = update.status_description;
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}
