//! Named actor predicates used by group gates.

use crate::actor::Actor;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether an actor belongs to a group.
pub type GroupFn = Arc<dyn Fn(&dyn Actor) -> bool + Send + Sync>;

/// Registry of group predicates.
///
/// Registering a name twice replaces the previous predicate. There is no
/// removal API.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, GroupFn>>,
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a group name with a predicate.
    pub fn register<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&dyn Actor) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(group = %name, "Registered group");
        self.groups.write().insert(name, Arc::new(predicate));
    }

    /// Evaluate the predicate registered for `name`.
    ///
    /// Returns `None` when no predicate is registered under that name.
    pub fn matches(&self, name: &str, actor: &dyn Actor) -> Option<bool> {
        // Clone the predicate out so user code never runs under the lock.
        let predicate = self.groups.read().get(name).cloned()?;
        Some(predicate(actor))
    }

    /// Check whether a predicate is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.groups.read().contains_key(name)
    }

    /// Number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    /// Check if no group is registered.
    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups = self.groups.read();
        let mut names: Vec<&String> = groups.keys().collect();
        names.sort();
        f.debug_struct("GroupRegistry").field("groups", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;

    #[test]
    fn test_register_and_match() {
        let registry = GroupRegistry::new();
        assert!(registry.is_empty());

        registry.register("admins", |a: &dyn Actor| {
            a.flipper_id().starts_with("Admin;")
        });

        assert!(registry.contains("admins"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.matches("admins", &ActorId::new("Admin;1")),
            Some(true)
        );
        assert_eq!(registry.matches("admins", &ActorId::new("1")), Some(false));
        assert_eq!(registry.matches("staff", &ActorId::new("1")), None);
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = GroupRegistry::new();
        registry.register("everyone", |_: &dyn Actor| false);
        registry.register("everyone", |_: &dyn Actor| true);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.matches("everyone", &ActorId::new("x")), Some(true));
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = GroupRegistry::new();
        registry.register("b", |_: &dyn Actor| true);
        registry.register("a", |_: &dyn Actor| true);

        assert_eq!(format!("{:?}", registry), r#"GroupRegistry { groups: ["a", "b"] }"#);
    }
}
