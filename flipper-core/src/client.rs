//! Decision client.
//!
//! [`Flipper`] turns enable/disable requests into store writes and folds the
//! stored gates of a feature into a single decision.

use crate::actor::Actor;
use crate::config::FlipperConfig;
use crate::error::{FlipperError, FlipperResult};
use crate::feature::Feature;
use crate::gates::{Gate, GateKey, GateSet, RANGE_FACTOR};
use crate::groups::GroupRegistry;
use crate::store::{GateStore, StoreOptions};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Gates checked when no actor is given.
pub const GLOBAL_CHECKS: [GateKey; 2] = [GateKey::Boolean, GateKey::PercentageOfTime];

/// Gates checked for each actor.
pub const ACTOR_CHECKS: [GateKey; 5] = [
    GateKey::Boolean,
    GateKey::Actors,
    GateKey::Groups,
    GateKey::PercentageOfActors,
    GateKey::PercentageOfTime,
];

/// Feature flag client.
///
/// Every call reads or writes the store directly; nothing is cached.
///
/// # Examples
///
/// ```
/// use flipper_core::{ActorId, Flipper, MemoryStore};
///
/// # #[tokio::main]
/// # async fn main() -> flipper_core::FlipperResult<()> {
/// let flipper = Flipper::new(MemoryStore::new());
/// let alice = ActorId::new("alice");
///
/// flipper.enable_for_actors("new-ui", &[&alice]).await?;
///
/// assert!(flipper.is_enabled("new-ui", &[&alice]).await?);
/// assert!(!flipper.is_enabled("new-ui", &[]).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Flipper {
    store: Arc<dyn GateStore>,
    groups: Arc<GroupRegistry>,
    config: FlipperConfig,
}

impl Flipper {
    /// Create a client over an already configured store.
    pub fn new<S: GateStore + 'static>(store: S) -> Self {
        Self::with_config(store, FlipperConfig::default())
    }

    /// Create a client with a custom configuration.
    pub fn with_config<S: GateStore + 'static>(store: S, config: FlipperConfig) -> Self {
        Self {
            store: Arc::new(store),
            groups: Arc::new(GroupRegistry::new()),
            config,
        }
    }

    /// Configure a store and create a client over it.
    ///
    /// Construction is aborted when the store rejects its options.
    pub async fn configure<S: GateStore + 'static>(
        mut store: S,
        options: &StoreOptions,
    ) -> FlipperResult<Self> {
        store.configure(options).await?;
        Ok(Self::new(store))
    }

    /// Use a shared group registry instead of the client's own.
    ///
    /// ```
    /// use flipper_core::{Flipper, FlipperConfig, GroupRegistry, MemoryStore};
    /// use std::sync::Arc;
    ///
    /// let groups = Arc::new(GroupRegistry::new());
    /// let config = FlipperConfig::builder().strict_percentages(true).build();
    /// let flipper = Flipper::with_config(MemoryStore::new(), config).with_groups(groups.clone());
    ///
    /// assert!(Arc::ptr_eq(flipper.groups(), &groups));
    /// assert!(flipper.config().strict_percentages);
    /// ```
    pub fn with_groups(mut self, groups: Arc<GroupRegistry>) -> Self {
        self.groups = groups;
        self
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn GateStore> {
        &self.store
    }

    /// Group registry consulted by group gates.
    pub fn groups(&self) -> &Arc<GroupRegistry> {
        &self.groups
    }

    /// Client configuration.
    pub fn config(&self) -> &FlipperConfig {
        &self.config
    }

    /// Associate a group name with a predicate.
    pub fn register_group<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&dyn Actor) -> bool + Send + Sync + 'static,
    {
        self.groups.register(name, predicate);
    }

    /// Check if a feature is enabled.
    ///
    /// Without actors only global gates are checked. With actors the check
    /// is cumulative: the feature is enabled only if it's enabled for every
    /// actor.
    pub async fn is_enabled(
        &self,
        feature_name: &str,
        actors: &[&dyn Actor],
    ) -> FlipperResult<bool> {
        let feature = Feature::new(feature_name);

        if actors.is_empty() {
            self.is_enabled_globally(&feature).await
        } else {
            self.is_enabled_for_actors(&feature, actors).await
        }
    }

    /// Enable a feature for every actor.
    pub async fn enable(&self, feature_name: &str) -> FlipperResult<()> {
        self.write(feature_name, Gate::Boolean(true), true).await
    }

    /// Disable a feature globally.
    ///
    /// Actors may still have the feature enabled through other gates.
    pub async fn disable(&self, feature_name: &str) -> FlipperResult<()> {
        self.write(feature_name, Gate::Boolean(false), false).await
    }

    /// Enable a feature for a list of actors.
    pub async fn enable_for_actors(
        &self,
        feature_name: &str,
        actors: &[&dyn Actor],
    ) -> FlipperResult<()> {
        let gate = actor_gate(actors, "enable")?;
        self.write(feature_name, gate, true).await
    }

    /// Disable a feature for a list of actors.
    pub async fn disable_for_actors(
        &self,
        feature_name: &str,
        actors: &[&dyn Actor],
    ) -> FlipperResult<()> {
        let gate = actor_gate(actors, "disable")?;
        self.write(feature_name, gate, false).await
    }

    /// Enable a feature for a list of groups.
    pub async fn enable_for_groups<S: AsRef<str>>(
        &self,
        feature_name: &str,
        groups: &[S],
    ) -> FlipperResult<()> {
        let gate = group_gate(groups, "enable")?;
        self.write(feature_name, gate, true).await
    }

    /// Disable a feature for a list of groups.
    pub async fn disable_for_groups<S: AsRef<str>>(
        &self,
        feature_name: &str,
        groups: &[S],
    ) -> FlipperResult<()> {
        let gate = group_gate(groups, "disable")?;
        self.write(feature_name, gate, false).await
    }

    /// Enable a feature for a percentage of the actors checked.
    pub async fn enable_for_percentage_of_actors(
        &self,
        feature_name: &str,
        percentage: u32,
    ) -> FlipperResult<()> {
        self.check_percentage(percentage)?;
        self.write(feature_name, Gate::PercentageOfActors(percentage), true)
            .await
    }

    /// Disable percentage of actors rollout for a feature.
    pub async fn disable_for_percentage_of_actors(&self, feature_name: &str) -> FlipperResult<()> {
        self.write(feature_name, Gate::PercentageOfActors(0), false)
            .await
    }

    /// Enable a feature for a percentage of the checks.
    pub async fn enable_for_percentage_of_time(
        &self,
        feature_name: &str,
        percentage: u32,
    ) -> FlipperResult<()> {
        self.check_percentage(percentage)?;
        self.write(feature_name, Gate::PercentageOfTime(percentage), true)
            .await
    }

    /// Disable percentage of time rollout for a feature.
    pub async fn disable_for_percentage_of_time(&self, feature_name: &str) -> FlipperResult<()> {
        self.write(feature_name, Gate::PercentageOfTime(0), false)
            .await
    }

    async fn is_enabled_globally(&self, feature: &Feature) -> FlipperResult<bool> {
        let gates = self.store.get(feature, &GLOBAL_CHECKS).await?;
        let open = gates.iter().any(|g| g.is_open(feature, None, &self.groups));

        debug!(
            feature = %feature,
            gates = gates.len(),
            enabled = open,
            "Checked feature globally"
        );
        Ok(open)
    }

    async fn is_enabled_for_actors(
        &self,
        feature: &Feature,
        actors: &[&dyn Actor],
    ) -> FlipperResult<bool> {
        let gates = self.store.get(feature, &ACTOR_CHECKS).await?;

        for &actor in actors {
            let open = gates
                .iter()
                .any(|g| g.is_open(feature, Some(actor), &self.groups));

            if !open {
                debug!(
                    feature = %feature,
                    actor = actor.flipper_id(),
                    gates = gates.len(),
                    "Feature disabled for actor"
                );
                return Ok(false);
            }
        }

        debug!(
            feature = %feature,
            actors = actors.len(),
            gates = gates.len(),
            "Feature enabled for actors"
        );
        Ok(true)
    }

    async fn write(&self, feature_name: &str, gate: Gate, enable: bool) -> FlipperResult<()> {
        let feature = Feature::new(feature_name);

        if enable {
            self.store.enable(&feature, &gate).await?;
        } else {
            self.store.disable(&feature, &gate).await?;
        }

        debug!(feature = %feature, gate = %gate.key(), enable, "Updated gate");
        Ok(())
    }

    fn check_percentage(&self, percentage: u32) -> FlipperResult<()> {
        if percentage <= RANGE_FACTOR {
            return Ok(());
        }
        if self.config.strict_percentages {
            return Err(FlipperError::InvalidPercentage(percentage));
        }
        warn!(percentage, "Percentage out of range, storing as is");
        Ok(())
    }
}

impl fmt::Debug for Flipper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flipper")
            .field("groups", &self.groups)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn actor_gate(actors: &[&dyn Actor], operation: &'static str) -> FlipperResult<Gate> {
    if actors.is_empty() {
        return Err(FlipperError::NoActors { operation });
    }
    let ids: GateSet = actors.iter().map(|a| a.flipper_id().to_string()).collect();
    Ok(Gate::Actors(ids))
}

fn group_gate<S: AsRef<str>>(groups: &[S], operation: &'static str) -> FlipperResult<Gate> {
    if groups.is_empty() {
        return Err(FlipperError::NoGroups { operation });
    }
    Ok(Gate::groups(groups.iter().map(|g| g.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that fails every call and counts them.
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn fail(&self) -> FlipperError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            FlipperError::backend(std::io::Error::other("store unavailable"))
        }
    }

    #[async_trait]
    impl GateStore for FailingStore {
        async fn configure(&mut self, options: &StoreOptions) -> FlipperResult<()> {
            if options.contains_key("url") {
                Ok(())
            } else {
                Err(FlipperError::Config("missing url".to_string()))
            }
        }

        async fn enable(&self, _: &Feature, _: &Gate) -> FlipperResult<()> {
            Err(self.fail())
        }

        async fn disable(&self, _: &Feature, _: &Gate) -> FlipperResult<()> {
            Err(self.fail())
        }

        async fn get(&self, _: &Feature, _: &[GateKey]) -> FlipperResult<Vec<Gate>> {
            Err(self.fail())
        }
    }

    #[tokio::test]
    async fn test_empty_lists_fail_fast() {
        let store = Arc::new(FailingStore::default());
        let flipper = Flipper::new(store.clone());

        let err = flipper.enable_for_actors("test", &[]).await.unwrap_err();
        assert!(matches!(err, FlipperError::NoActors { operation: "enable" }));

        let err = flipper.disable_for_actors("test", &[]).await.unwrap_err();
        assert!(matches!(err, FlipperError::NoActors { operation: "disable" }));

        let none: [&str; 0] = [];
        let err = flipper.enable_for_groups("test", &none).await.unwrap_err();
        assert!(matches!(err, FlipperError::NoGroups { operation: "enable" }));

        let err = flipper.disable_for_groups("test", &none).await.unwrap_err();
        assert!(err.is_caller_error());

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let flipper = Flipper::new(FailingStore::default());
        let actor = ActorId::new("a");

        assert!(flipper.is_enabled("test", &[]).await.unwrap_err().is_backend_error());
        assert!(flipper.is_enabled("test", &[&actor]).await.unwrap_err().is_backend_error());
        assert!(flipper.enable("test").await.is_err());
        assert!(flipper.disable_for_percentage_of_time("test").await.is_err());
    }

    #[tokio::test]
    async fn test_configure_aborts_on_error() {
        let err = Flipper::configure(FailingStore::default(), &StoreOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FlipperError::Config(_)));

        let mut options = StoreOptions::new();
        options.insert("url".to_string(), "memory://".into());
        assert!(Flipper::configure(FailingStore::default(), &options).await.is_ok());
    }

    #[tokio::test]
    async fn test_configure_through_arc() {
        let err = Flipper::configure(Arc::new(FailingStore::default()), &StoreOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FlipperError::Config(ref msg) if msg == "missing url"));

        let mut options = StoreOptions::new();
        options.insert("url".to_string(), "memory://".into());
        assert!(
            Flipper::configure(Arc::new(FailingStore::default()), &options)
                .await
                .is_ok()
        );

        // A store already shared elsewhere can't be reconfigured
        let store = Arc::new(FailingStore::default());
        let _other = store.clone();
        let err = Flipper::configure(store, &options).await.unwrap_err();
        assert!(matches!(err, FlipperError::Config(ref msg) if msg.contains("shared")));
    }

    #[tokio::test]
    async fn test_strict_percentages() {
        let store = MemoryStore::new();
        let config = FlipperConfig::builder().strict_percentages(true).build();
        let flipper = Flipper::with_config(store.clone(), config);

        let err = flipper
            .enable_for_percentage_of_actors("test", 101)
            .await
            .unwrap_err();
        assert!(matches!(err, FlipperError::InvalidPercentage(101)));
        assert!(store.is_empty().await);

        flipper.enable_for_percentage_of_time("test", 100).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_lenient_percentages_are_stored() {
        let store = MemoryStore::new();
        let flipper = Flipper::new(store.clone());
        let actor = ActorId::new("a");

        flipper.enable_for_percentage_of_actors("test", 150).await.unwrap();

        let gates = store
            .get(&Feature::new("test"), &[GateKey::PercentageOfActors])
            .await
            .unwrap();
        assert_eq!(gates, vec![Gate::PercentageOfActors(150)]);
        assert!(flipper.is_enabled("test", &[&actor]).await.unwrap());
    }

    #[tokio::test]
    async fn test_shared_group_registry() {
        let groups = Arc::new(GroupRegistry::new());
        let store = MemoryStore::new();
        let first = Flipper::new(store.clone()).with_groups(groups.clone());
        let second = Flipper::new(store).with_groups(groups);

        first.register_group("everyone", |_: &dyn Actor| true);
        second.enable_for_groups("test", &["everyone"]).await.unwrap();

        assert!(second.groups().contains("everyone"));
        assert!(second.is_enabled("test", &[&ActorId::new("x")]).await.unwrap());
    }
}
