//! Features and feature-scoped actor identities.

use crate::actor::Actor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named feature flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    name: String,
}

impl Feature {
    /// Create a feature by its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Feature name, used verbatim as a persistence key.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Actor identity scoped to a feature.
///
/// Its id is the feature name immediately followed by the actor id, so the
/// same actor hashes independently for every feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedActor {
    id: String,
}

impl FeaturedActor {
    pub fn new(feature: &Feature, actor: &dyn Actor) -> Self {
        let mut id = String::with_capacity(feature.name().len() + actor.flipper_id().len());
        id.push_str(feature.name());
        id.push_str(actor.flipper_id());
        Self { id }
    }
}

impl Actor for FeaturedActor {
    fn flipper_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;

    #[test]
    fn test_featured_actor_id() {
        let feature = Feature::new("test");
        let actor = ActorId::new("58474832756cfb0015870214");

        let featured = FeaturedActor::new(&feature, &actor);
        assert_eq!(featured.flipper_id(), "test58474832756cfb0015870214");
    }

    #[test]
    fn test_feature_name() {
        let feature = Feature::new("new-ui");
        assert_eq!(feature.name(), "new-ui");
        assert_eq!(feature.to_string(), "new-ui");
    }
}
