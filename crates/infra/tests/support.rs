#![allow(dead_code)]

use std::sync::Arc;

use carrierlink_infra::database::{
    DbManager, SqliteSubscriptionRepository, SqliteTransactionRepository,
};
use tempfile::TempDir;

/// Temporary migrated database that lives as long as the value.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("gateway.db"), 4)
            .expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn subscriptions(&self) -> Arc<SqliteSubscriptionRepository> {
        Arc::new(SqliteSubscriptionRepository::new(Arc::clone(&self.manager)))
    }

    pub fn transactions(&self) -> Arc<SqliteTransactionRepository> {
        Arc::new(SqliteTransactionRepository::new(Arc::clone(&self.manager)))
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}
