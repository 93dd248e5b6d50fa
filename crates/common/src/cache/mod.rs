//! Expiring key/value storage
//!
//! - [`TtlCache`]: concurrent map with per-entry TTL and lazy expiry on read
//! - [`CacheSweeper`]: background task purging expired entries on an interval
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use carrierlink_common::cache::{CacheSweeper, TtlCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: Arc<TtlCache<String, String>> = Arc::new(TtlCache::new());
//! let sweeper = CacheSweeper::new(cache.clone(), Duration::from_secs(60));
//! sweeper.start().unwrap();
//!
//! cache.set("token".into(), "abc".into(), Duration::from_secs(3000));
//! assert_eq!(cache.get(&"token".into()).as_deref(), Some("abc"));
//!
//! sweeper.stop().await.unwrap();
//! # }
//! ```

mod stats;
mod sweeper;
mod ttl;

pub use stats::CacheStats;
pub use sweeper::CacheSweeper;
pub use ttl::{Expiring, TtlCache};
