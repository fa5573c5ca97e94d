//! Redis gate store for Flipper.
//!
//! ```no_run
//! use flipper_core::{ActorId, Flipper};
//! use flipper_redis::{RedisStore, RedisStoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> flipper_core::FlipperResult<()> {
//!     let config = RedisStoreConfig::new("redis://localhost:6379")
//!         .with_key_prefix("myapp");
//!     let flipper = Flipper::new(RedisStore::connect(config).await?);
//!
//!     flipper.enable_for_percentage_of_actors("new-checkout", 25).await?;
//!     let user = ActorId::new("user-1");
//!     let enabled = flipper.is_enabled("new-checkout", &[&user]).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod store;

pub use config::{DEFAULT_KEY_PREFIX, RedisStoreConfig, RedisStoreConfigBuilder};
pub use store::RedisStore;

// Re-export redis crate for convenience
pub use redis;
