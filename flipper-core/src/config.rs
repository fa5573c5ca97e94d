//! Decision client configuration.

use serde::{Deserialize, Serialize};

/// Decision client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipperConfig {
    /// Reject percentages above 100 instead of persisting them.
    #[serde(default)]
    pub strict_percentages: bool,
}

impl FlipperConfig {
    /// Create a builder.
    pub fn builder() -> FlipperConfigBuilder {
        FlipperConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// * `FLIPPER_STRICT_PERCENTAGES` - `1`/`true` to reject out of range percentages
    pub fn from_env() -> FlipperConfigBuilder {
        let mut builder = FlipperConfigBuilder::new();

        if let Ok(strict) = std::env::var("FLIPPER_STRICT_PERCENTAGES") {
            let strict = strict == "1" || strict.eq_ignore_ascii_case("true");
            builder = builder.strict_percentages(strict);
        }

        builder
    }
}

/// Builder for [`FlipperConfig`].
#[derive(Debug, Default)]
pub struct FlipperConfigBuilder {
    config: FlipperConfig,
}

impl FlipperConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject percentages above 100.
    pub fn strict_percentages(mut self, enabled: bool) -> Self {
        self.config.strict_percentages = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FlipperConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlipperConfig::default();
        assert!(!config.strict_percentages);
    }

    #[test]
    fn test_builder() {
        let config = FlipperConfig::builder().strict_percentages(true).build();
        assert!(config.strict_percentages);
    }

    #[test]
    fn test_deserialize() {
        let config: FlipperConfig =
            serde_json::from_str(r#"{"strict_percentages": true}"#).unwrap();
        assert!(config.strict_percentages);

        let config: FlipperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FlipperConfig::default());
    }
}
