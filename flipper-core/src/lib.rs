//! Flipper core
//!
//! Feature toggles decided by composing independently persisted gates.
//!
//! # Gates
//!
//! - **Boolean** - on or off for everybody
//! - **Actors** - on for an explicit set of actor ids
//! - **Groups** - on for actors matching registered group predicates
//! - **Percentage of actors** - on for a stable share of actors (CRC-32 bucketing)
//! - **Percentage of time** - on for a random share of checks
//!
//! # Quick Start
//!
//! ```
//! use flipper_core::*;
//!
//! # #[tokio::main]
//! # async fn main() -> FlipperResult<()> {
//! let flipper = Flipper::new(MemoryStore::new());
//!
//! flipper.register_group("admins", |a: &dyn Actor| {
//!     a.flipper_id().starts_with("Admin;")
//! });
//! flipper.enable_for_groups("dashboard", &["admins"]).await?;
//!
//! let admin = ActorId::new("Admin;42");
//! let guest = ActorId::new("42");
//!
//! assert!(flipper.is_enabled("dashboard", &[&admin]).await?);
//! // Every actor must pass
//! assert!(!flipper.is_enabled("dashboard", &[&admin, &guest]).await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Stores
//!
//! The client only talks to a [`GateStore`]. [`MemoryStore`] is the reference
//! implementation; other backends live in their own crates and are passed to
//! [`Flipper::new`] once constructed.

pub mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod feature;
pub mod gates;
pub mod groups;
pub mod memory;
pub mod store;

pub use actor::{Actor, ActorId};
pub use client::{ACTOR_CHECKS, Flipper, GLOBAL_CHECKS};
pub use config::{FlipperConfig, FlipperConfigBuilder};
pub use error::{FlipperError, FlipperResult};
pub use feature::{Feature, FeaturedActor};
pub use gates::{Gate, GateKey, GateSet, RANGE_FACTOR, SCALING_FACTOR, gate_set};
pub use groups::{GroupFn, GroupRegistry};
pub use memory::MemoryStore;
pub use store::{GateStore, StoreOptions};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actor::{Actor, ActorId};
    pub use crate::client::Flipper;
    pub use crate::config::FlipperConfig;
    pub use crate::error::{FlipperError, FlipperResult};
    pub use crate::gates::{Gate, GateKey};
    pub use crate::memory::MemoryStore;
    pub use crate::store::{GateStore, StoreOptions};
}
