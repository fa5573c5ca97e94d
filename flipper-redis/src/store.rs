//! Redis gate store implementation.

use crate::config::{DEFAULT_KEY_PREFIX, RedisStoreConfig};
use async_trait::async_trait;
use flipper_core::{
    Feature, FlipperError, FlipperResult, Gate, GateKey, GateSet, GateStore, StoreOptions,
};
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Gate store persisting gates in Redis.
///
/// Every gate lives under its own key, `{prefix}:feature:{name}:{gate}`:
///
/// * boolean gates are the string `true`, deleted when disabled
/// * actor and group gates are Redis sets, so merges (`SADD`) and removals
///   (`SREM`) are atomic per key
/// * percentages are integer strings
#[derive(Clone)]
pub struct RedisStore {
    connection: Option<ConnectionManager>,
    key_prefix: String,
}

impl RedisStore {
    /// Create an unconfigured store.
    ///
    /// Call [`GateStore::configure`] before use, or build a connected store
    /// with [`RedisStore::connect`].
    pub fn new() -> Self {
        Self {
            connection: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Connect to Redis.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flipper_redis::{RedisStore, RedisStoreConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> flipper_core::FlipperResult<()> {
    ///     let config = RedisStoreConfig::new("redis://localhost:6379");
    ///     let store = RedisStore::connect(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: RedisStoreConfig) -> FlipperResult<Self> {
        config.validate()?;

        let client = Client::open(config.connection_url())
            .map_err(|e| FlipperError::Config(format!("invalid redis URL: {}", e)))?;

        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(FlipperError::backend)?;

        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(FlipperError::backend)?;

        info!(url = %config.url, prefix = %config.key_prefix, "Redis gate store connected");

        Ok(Self::with_connection(connection, config.key_prefix))
    }

    /// Create a store over an existing connection.
    pub fn with_connection(connection: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            connection: Some(connection),
            key_prefix: key_prefix.into(),
        }
    }

    /// Key prefix of this store.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Check if the store holds a connection.
    pub fn is_configured(&self) -> bool {
        self.connection.is_some()
    }

    fn connection(&self) -> FlipperResult<ConnectionManager> {
        self.connection.clone().ok_or_else(|| {
            FlipperError::NotConfigured("redis store has no connection".to_string())
        })
    }

    fn build_key(&self, feature: &Feature, key: GateKey) -> String {
        format!("{}:feature:{}:{}", self.key_prefix, feature.name(), key)
    }
}

impl Default for RedisStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn members(set: &GateSet) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

fn parse_percentage(key: GateKey, raw: &str) -> FlipperResult<u32> {
    raw.parse().map_err(|_| FlipperError::unexpected(key, raw))
}

#[async_trait]
impl GateStore for RedisStore {
    /// Options: `url` (required), `key_prefix` (default `flipper`), `database`.
    async fn configure(&mut self, options: &StoreOptions) -> FlipperResult<()> {
        let config: RedisStoreConfig =
            serde_json::from_value(serde_json::Value::Object(options.clone())).map_err(|e| {
                FlipperError::Config(format!("error decoding redis store configuration: {}", e))
            })?;

        *self = Self::connect(config).await?;
        Ok(())
    }

    async fn enable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        let key = self.build_key(feature, gate.key());
        let mut conn = self.connection()?;

        match gate {
            Gate::Boolean(_) => {
                let _: () = conn.set(&key, "true").await.map_err(FlipperError::backend)?;
            }
            Gate::PercentageOfActors(p) | Gate::PercentageOfTime(p) => {
                let _: () = conn.set(&key, *p).await.map_err(FlipperError::backend)?;
            }
            Gate::Actors(set) | Gate::Groups(set) => {
                if !set.is_empty() {
                    let _: () = conn
                        .sadd(&key, members(set))
                        .await
                        .map_err(FlipperError::backend)?;
                }
            }
        }

        debug!(key = %key, "Enabled gate");
        Ok(())
    }

    async fn disable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        let key = self.build_key(feature, gate.key());
        let mut conn = self.connection()?;

        match gate {
            Gate::Boolean(_) => {
                let _: () = conn.del(&key).await.map_err(FlipperError::backend)?;
            }
            Gate::PercentageOfActors(p) | Gate::PercentageOfTime(p) => {
                let _: () = conn.set(&key, *p).await.map_err(FlipperError::backend)?;
            }
            Gate::Actors(set) | Gate::Groups(set) => {
                if !set.is_empty() {
                    let _: () = conn
                        .srem(&key, members(set))
                        .await
                        .map_err(FlipperError::backend)?;
                }
            }
        }

        debug!(key = %key, "Disabled gate");
        Ok(())
    }

    async fn get(&self, feature: &Feature, keys: &[GateKey]) -> FlipperResult<Vec<Gate>> {
        let mut conn = self.connection()?;
        let mut gates = Vec::with_capacity(keys.len());

        for &key in keys {
            let redis_key = self.build_key(feature, key);

            match key {
                GateKey::Boolean => {
                    let value: Option<String> =
                        conn.get(&redis_key).await.map_err(FlipperError::backend)?;
                    match value.as_deref() {
                        None => {}
                        Some("true") => gates.push(Gate::Boolean(true)),
                        Some(other) => return Err(FlipperError::unexpected(key, other)),
                    }
                }
                GateKey::Actors | GateKey::Groups => {
                    let stored: Vec<String> = conn
                        .smembers(&redis_key)
                        .await
                        .map_err(FlipperError::backend)?;
                    // Redis drops empty sets, so an empty reply means no gate.
                    if stored.is_empty() {
                        continue;
                    }
                    let set: GateSet = stored.into_iter().collect();
                    gates.push(if key == GateKey::Actors {
                        Gate::Actors(set)
                    } else {
                        Gate::Groups(set)
                    });
                }
                GateKey::PercentageOfActors | GateKey::PercentageOfTime => {
                    let value: Option<String> =
                        conn.get(&redis_key).await.map_err(FlipperError::backend)?;
                    let Some(raw) = value else {
                        continue;
                    };
                    let percentage = parse_percentage(key, &raw)?;
                    gates.push(if key == GateKey::PercentageOfActors {
                        Gate::PercentageOfActors(percentage)
                    } else {
                        Gate::PercentageOfTime(percentage)
                    });
                }
            }
        }

        Ok(gates)
    }
}
