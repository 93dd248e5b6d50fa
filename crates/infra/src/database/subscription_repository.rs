//! SQLite implementation of the subscription repository port.

use std::sync::Arc;

use async_trait::async_trait;
use carrierlink_core::SubscriptionRepository;
use carrierlink_domain::{
    GatewayError, NewSubscription, Result as DomainResult, StatusUpdate, SubscriptionRecord,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::{from_seconds, map_join_error, now_seconds, DbManager};
use crate::errors::to_gateway;

const SUBSCRIPTION_COLUMNS: &str = "id, external_id, plan_id, msisdn, method, status, \
     status_description, callback_url, created_at, updated_at";

const UPSERT_SQL: &str = "INSERT INTO subscriptions (external_id, plan_id, msisdn, method, status, \
     status_description, callback_url, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
     ON CONFLICT (plan_id, msisdn) DO UPDATE SET \
         external_id = excluded.external_id, \
         method = excluded.method, \
         status = excluded.status, \
         status_description = excluded.status_description, \
         callback_url = excluded.callback_url, \
         updated_at = excluded.updated_at \
     RETURNING id, external_id, plan_id, msisdn, method, status, status_description, \
         callback_url, created_at, updated_at";

/// Subscriptions keyed by `(plan_id, msisdn)`
pub struct SqliteSubscriptionRepository {
    db: Arc<DbManager>,
}

impl SqliteSubscriptionRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn find_one(
        db: &DbManager,
        clause: &str,
        first: &str,
        second: &str,
    ) -> DomainResult<Option<SubscriptionRecord>> {
        let conn = db.get_connection()?;
        let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE {clause}");
        conn.query_row(&sql, params![first, second], map_subscription_row)
            .optional()
            .map_err(to_gateway)
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn upsert(&self, subscription: NewSubscription) -> DomainResult<SubscriptionRecord> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<SubscriptionRecord> {
            let conn = db.get_connection()?;
            conn.query_row(
                UPSERT_SQL,
                params![
                    subscription.external_id,
                    subscription.plan_id,
                    subscription.msisdn,
                    subscription.method,
                    subscription.status,
                    subscription.status_description,
                    subscription.callback_url,
                    now_seconds(),
                ],
                map_subscription_row,
            )
            .map_err(to_gateway)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_plan_and_msisdn(
        &self,
        plan_id: &str,
        msisdn: &str,
    ) -> DomainResult<Option<SubscriptionRecord>> {
        let db = Arc::clone(&self.db);
        let (plan_id, msisdn) = (plan_id.to_string(), msisdn.to_string());

        task::spawn_blocking(move || {
            Self::find_one(&db, "plan_id = ?1 AND msisdn = ?2", &plan_id, &msisdn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> DomainResult<Option<SubscriptionRecord>> {
        let db = Arc::clone(&self.db);
        let (external_id, plan_id) = (external_id.to_string(), plan_id.to_string());

        task::spawn_blocking(move || {
            Self::find_one(
                &db,
                "external_id = ?1 AND plan_id = ?2 ORDER BY updated_at DESC, id DESC LIMIT 1",
                &external_id,
                &plan_id,
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_status(&self, id: i64, update: StatusUpdate) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE subscriptions SET status = ?1, status_description = ?2, updated_at = ?3 WHERE id = ?4",
                    params![update.status, update.status_description, now_seconds(), id],
                )
                .map_err(to_gateway)?;
            if changed == 0 {
                return Err(GatewayError::Database(format!("subscription {id} does not exist")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_subscription_row(row: &Row<'_>) -> rusqlite::Result<SubscriptionRecord> {
    Ok(SubscriptionRecord {
        id: row.get(0)?,
        external_id: row.get(1)?,
        plan_id: row.get(2)?,
        msisdn: row.get(3)?,
        method: row.get(4)?,
        status: row.get(5)?,
        status_description: row.get(6)?,
        callback_url: row.get(7)?,
        created_at: from_seconds(row.get(8)?),
        updated_at: from_seconds(row.get(9)?),
    })
}
