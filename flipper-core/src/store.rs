//! Gate store trait definition.

use crate::error::{FlipperError, FlipperResult};
use crate::feature::Feature;
use crate::gates::{Gate, GateKey};
use async_trait::async_trait;
use std::sync::Arc;

/// Backend options, decoded by each store into its own configuration type.
pub type StoreOptions = serde_json::Map<String, serde_json::Value>;

/// Persistence contract for feature gates.
///
/// Values are keyed by feature name and [`GateKey`]. Implementations must
/// provide at least per-key atomicity for set merges and removals.
#[async_trait]
pub trait GateStore: Send + Sync {
    /// One-time backend setup.
    ///
    /// Stores without configuration accept any options.
    async fn configure(&mut self, _options: &StoreOptions) -> FlipperResult<()> {
        Ok(())
    }

    /// Persist the open representation of a gate.
    ///
    /// * Boolean gates are stored as `true`.
    /// * Actor and group sets are merged into any stored set.
    /// * Percentages overwrite the stored value.
    async fn enable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()>;

    /// Persist the closed representation of a gate.
    ///
    /// * Boolean gates are removed.
    /// * Only the given actor or group members are removed from a stored set.
    /// * Percentages overwrite the stored value.
    async fn disable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()>;

    /// Load the stored gates of a feature for the given keys.
    ///
    /// Keys without a stored value are omitted from the result. Gates are
    /// returned in the order of `keys`.
    async fn get(&self, feature: &Feature, keys: &[GateKey]) -> FlipperResult<Vec<Gate>>;
}

#[async_trait]
impl<S: GateStore + ?Sized> GateStore for Arc<S> {
    /// Only a store that is not shared yet can be configured.
    async fn configure(&mut self, options: &StoreOptions) -> FlipperResult<()> {
        Arc::get_mut(self)
            .ok_or_else(|| FlipperError::Config("shared store cannot be configured".to_string()))?
            .configure(options)
            .await
    }

    async fn enable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        (**self).enable(feature, gate).await
    }

    async fn disable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        (**self).disable(feature, gate).await
    }

    async fn get(&self, feature: &Feature, keys: &[GateKey]) -> FlipperResult<Vec<Gate>> {
        (**self).get(feature, keys).await
    }
}
