//! SQLite implementation of the transaction repository port.

use std::sync::Arc;

use async_trait::async_trait;
use carrierlink_core::TransactionRepository;
use carrierlink_domain::{
    GatewayError, NewTransaction, Result as DomainResult, StatusUpdate, TransactionRecord,
};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::{from_seconds, map_join_error, now_seconds, DbManager};
use crate::errors::to_gateway;

const INSERT_SQL: &str = "INSERT INTO transactions (external_id, subscription_id, status, \
     status_description, amount, callback_url, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
     RETURNING id, external_id, subscription_id, status, status_description, amount, \
         callback_url, created_at, updated_at";

// Transactions carry no plan; it is matched on the owning subscription.
const FIND_BY_EXTERNAL_AND_PLAN_SQL: &str = "SELECT t.id, t.external_id, t.subscription_id, \
     t.status, t.status_description, t.amount, t.callback_url, t.created_at, t.updated_at \
     FROM transactions t \
     JOIN subscriptions s ON s.id = t.subscription_id \
     WHERE t.external_id = ?1 AND s.plan_id = ?2 \
     ORDER BY t.id DESC LIMIT 1";

/// Charge transactions linked to their subscription
pub struct SqliteTransactionRepository {
    db: Arc<DbManager>,
}

impl SqliteTransactionRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn insert(&self, transaction: NewTransaction) -> DomainResult<TransactionRecord> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<TransactionRecord> {
            let conn = db.get_connection()?;
            conn.query_row(
                INSERT_SQL,
                params![
                    transaction.external_id,
                    transaction.subscription_id,
                    transaction.status,
                    transaction.status_description,
                    transaction.amount,
                    transaction.callback_url,
                    now_seconds(),
                ],
                map_transaction_row,
            )
            .map_err(to_gateway)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_external_and_plan(
        &self,
        external_id: &str,
        plan_id: &str,
    ) -> DomainResult<Option<TransactionRecord>> {
        let db = Arc::clone(&self.db);
        let (external_id, plan_id) = (external_id.to_string(), plan_id.to_string());

        task::spawn_blocking(move || -> DomainResult<Option<TransactionRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(
                FIND_BY_EXTERNAL_AND_PLAN_SQL,
                params![external_id, plan_id],
                map_transaction_row,
            )
            .optional()
            .map_err(to_gateway)
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
                    "UPDATE transactions SET status = ?1, status_description = ?2, updated_at = ?3 WHERE id = ?4",
                    params![update.status, update.status_description, now_seconds(), id],
                )
                .map_err(to_gateway)?;
            if changed == 0 {
                return Err(GatewayError::Database(format!("transaction {id} does not exist")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_transaction_row(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        external_id: row.get(1)?,
        subscription_id: row.get(2)?,
        status: row.get(3)?,
        status_description: row.get(4)?,
        amount: row.get(5)?,
        callback_url: row.get(6)?,
        created_at: from_seconds(row.get(7)?),
        updated_at: from_seconds(row.get(8)?),
    })
}
