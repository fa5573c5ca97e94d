// Flipper - feature toggles for Rust
//
// This library decides whether a feature is enabled for zero or more actors by
// composing boolean, actor, group and percentage gates kept in a pluggable store.

// Re-export core functionality
pub use flipper_core::*;

// Re-export optional crates
#[cfg(feature = "redis")]
pub use flipper_redis;

mod wiring;

pub use wiring::{StoreConfig, connect, connect_with_config};

// Prelude for common imports
pub mod prelude {
    pub use crate::wiring::{StoreConfig, connect};
    pub use flipper_core::prelude::*;

    #[cfg(feature = "redis")]
    pub use flipper_redis::{RedisStore, RedisStoreConfig};
}
