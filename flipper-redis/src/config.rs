//! Redis store configuration.

use flipper_core::{FlipperError, FlipperResult};
use serde::{Deserialize, Serialize};

/// Prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "flipper";

/// Redis store configuration.
///
/// Deserializes from store options such as
/// `{"url": "redis://127.0.0.1:6379", "key_prefix": "flags", "database": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis URL (redis://host:port or rediss://host:port for TLS). Required.
    pub url: String,
    /// Prefix for every key written by the store.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Database number, when not part of the URL.
    #[serde(default)]
    pub database: Option<u8>,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            key_prefix: default_key_prefix(),
            database: None,
        }
    }
}

impl RedisStoreConfig {
    /// Create a configuration for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a builder.
    pub fn builder() -> RedisStoreConfigBuilder {
        RedisStoreConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// * `FLIPPER_REDIS_URL` - connection URL
    /// * `FLIPPER_REDIS_PREFIX` - key prefix
    /// * `FLIPPER_REDIS_DATABASE` - database number
    pub fn from_env() -> RedisStoreConfigBuilder {
        let mut builder = RedisStoreConfigBuilder::new();

        if let Ok(url) = std::env::var("FLIPPER_REDIS_URL") {
            builder = builder.url(url);
        }

        if let Ok(prefix) = std::env::var("FLIPPER_REDIS_PREFIX") {
            builder = builder.key_prefix(prefix);
        }

        if let Ok(db) = std::env::var("FLIPPER_REDIS_DATABASE")
            && let Ok(db) = db.parse()
        {
            builder = builder.database(db);
        }

        builder
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the database number.
    pub fn with_database(mut self, database: u8) -> Self {
        self.database = Some(database);
        self
    }

    /// Check required parameters.
    pub fn validate(&self) -> FlipperResult<()> {
        if self.url.trim().is_empty() {
            return Err(FlipperError::Config(
                "invalid connection URL for redis store".to_string(),
            ));
        }
        Ok(())
    }

    /// Full connection URL including the database.
    pub fn connection_url(&self) -> String {
        match self.database {
            Some(db) if !has_database(&self.url) => {
                format!("{}/{}", self.url.trim_end_matches('/'), db)
            }
            _ => self.url.clone(),
        }
    }
}

/// Builder for [`RedisStoreConfig`].
#[derive(Debug, Default)]
pub struct RedisStoreConfigBuilder {
    config: RedisStoreConfig,
}

impl RedisStoreConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Redis URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the key prefix.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the database number.
    pub fn database(mut self, db: u8) -> Self {
        self.config.database = Some(db);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RedisStoreConfig {
        self.config
    }
}

/// Whether the URL already selects a database (`redis://host:port/N`).
fn has_database(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split_once('/')
        .is_some_and(|(_, path)| !path.trim_matches('/').is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisStoreConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.key_prefix, "flipper");
        assert_eq!(config.database, None);
    }

    #[test]
    fn test_builder() {
        let config = RedisStoreConfig::new("redis://cache:6379")
            .with_key_prefix("flags")
            .with_database(3);

        assert_eq!(config.key_prefix, "flags");
        assert_eq!(config.connection_url(), "redis://cache:6379/3");
    }

    #[test]
    fn test_config_builder() {
        let config = RedisStoreConfig::builder()
            .url("redis://cache:6379")
            .key_prefix("flags")
            .database(4)
            .build();

        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.key_prefix, "flags");
        assert_eq!(config.connection_url(), "redis://cache:6379/4");

        let config = RedisStoreConfigBuilder::new().build();
        assert_eq!(config, RedisStoreConfig::default());
    }

    #[test]
    fn test_connection_url_keeps_database_from_url() {
        let config = RedisStoreConfig::new("redis://cache:6379/1").with_database(3);
        assert_eq!(config.connection_url(), "redis://cache:6379/1");

        let config = RedisStoreConfig::new("redis://cache:6379/").with_database(2);
        assert_eq!(config.connection_url(), "redis://cache:6379/2");
    }

    #[test]
    fn test_deserialize_options() {
        let config: RedisStoreConfig =
            serde_json::from_str(r#"{"url": "redis://127.0.0.1:6379"}"#).unwrap();
        assert_eq!(config.key_prefix, DEFAULT_KEY_PREFIX);

        let err = serde_json::from_str::<RedisStoreConfig>(r#"{"key_prefix": "x"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_validate() {
        assert!(RedisStoreConfig::new("redis://localhost").validate().is_ok());

        let err = RedisStoreConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, FlipperError::Config(_)));
    }
}
