//! Backend selection from configuration.

use flipper_core::{Flipper, FlipperConfig, FlipperError, FlipperResult, MemoryStore};
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "redis")]
use flipper_redis::{RedisStore, RedisStoreConfig};

/// Store backend to build a client over.
///
/// Deserializes from an object tagged by `driver`:
///
/// ```
/// use flipper::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"driver": "memory"}"#).unwrap();
/// assert_eq!(config.driver(), "memory");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local [`MemoryStore`]
    #[default]
    Memory,
    /// Redis store
    #[cfg(feature = "redis")]
    Redis(RedisStoreConfig),
}

impl StoreConfig {
    /// Name of the selected driver.
    pub fn driver(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            #[cfg(feature = "redis")]
            StoreConfig::Redis(_) => "redis",
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `FLIPPER_DRIVER` selects the backend (`memory` by default). Backend
    /// specific variables are read by the backend configuration.
    pub fn from_env() -> FlipperResult<Self> {
        let driver = std::env::var("FLIPPER_DRIVER").unwrap_or_else(|_| "memory".to_string());
        Self::for_driver(&driver)
    }

    fn for_driver(driver: &str) -> FlipperResult<Self> {
        match driver {
            "memory" => Ok(StoreConfig::Memory),
            #[cfg(feature = "redis")]
            "redis" => Ok(StoreConfig::Redis(RedisStoreConfig::from_env().build())),
            other => Err(FlipperError::Config(format!(
                "flipper driver not available: {}",
                other
            ))),
        }
    }
}

/// Build the configured store and a client over it.
///
/// # Examples
///
/// ```
/// # #[tokio::main]
/// # async fn main() -> flipper::FlipperResult<()> {
/// let flipper = flipper::connect(flipper::StoreConfig::Memory).await?;
///
/// flipper.enable("feature").await?;
/// assert!(flipper.is_enabled("feature", &[]).await?);
/// # Ok(())
/// # }
/// ```
pub async fn connect(config: StoreConfig) -> FlipperResult<Flipper> {
    connect_with_config(config, FlipperConfig::default()).await
}

/// Build the configured store and a client with a custom configuration.
pub async fn connect_with_config(
    config: StoreConfig,
    flipper_config: FlipperConfig,
) -> FlipperResult<Flipper> {
    let driver = config.driver();

    let flipper = match config {
        StoreConfig::Memory => Flipper::with_config(MemoryStore::new(), flipper_config),
        #[cfg(feature = "redis")]
        StoreConfig::Redis(redis) => {
            let store = RedisStore::connect(redis).await?;
            Flipper::with_config(store, flipper_config)
        }
    };

    info!(driver, "Flipper client initialized");
    Ok(flipper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        assert_eq!(StoreConfig::default(), StoreConfig::Memory);
        assert_eq!(StoreConfig::default().driver(), "memory");
    }

    #[test]
    fn test_unknown_driver() {
        let err = StoreConfig::for_driver("mongodb").unwrap_err();
        assert!(matches!(err, FlipperError::Config(ref msg) if msg.contains("mongodb")));
    }

    #[cfg(feature = "redis")]
    #[test]
    fn test_deserialize_redis() {
        let config: StoreConfig = serde_json::from_str(
            r#"{"driver": "redis", "url": "redis://127.0.0.1:6379", "key_prefix": "flags"}"#,
        )
        .unwrap();

        match config {
            StoreConfig::Redis(redis) => {
                assert_eq!(redis.url, "redis://127.0.0.1:6379");
                assert_eq!(redis.key_prefix, "flags");
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    async fn test_redis_requires_url() {
        let config = StoreConfig::Redis(RedisStoreConfig::new(""));
        let err = connect(config).await.unwrap_err();
        assert!(matches!(err, FlipperError::Config(_)));
    }

    #[tokio::test]
    async fn test_connect_memory() {
        let config = FlipperConfig::builder().strict_percentages(true).build();
        let flipper = connect_with_config(StoreConfig::Memory, config).await.unwrap();

        assert!(flipper.config().strict_percentages);
        assert!(!flipper.is_enabled("anything", &[]).await.unwrap());
    }
}
