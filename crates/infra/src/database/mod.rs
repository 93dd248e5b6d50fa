//! SQLite persistence for subscriptions and transactions

pub mod manager;
pub mod subscription_repository;
pub mod transaction_repository;

pub use manager::{DbManager, SqliteConnection, SqlitePool};
pub use subscription_repository::SqliteSubscriptionRepository;
pub use transaction_repository::SqliteTransactionRepository;
