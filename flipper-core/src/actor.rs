//! Requesting identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything a feature can be checked for.
///
/// The only requirement is a stable, unique identifier.
pub trait Actor: Send + Sync {
    /// Identifier used for actor sets and percentage rollouts.
    fn flipper_id(&self) -> &str;
}

impl Actor for String {
    fn flipper_id(&self) -> &str {
        self
    }
}

impl<A: Actor + ?Sized> Actor for &A {
    fn flipper_id(&self) -> &str {
        (**self).flipper_id()
    }
}

/// Plain actor backed by its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Actor for ActorId {
    fn flipper_id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id() {
        let actor = ActorId::new("user-1");
        assert_eq!(actor.flipper_id(), "user-1");
        assert_eq!(actor.to_string(), "user-1");
        assert_eq!(ActorId::from("user-1"), actor);
    }

    #[test]
    fn test_string_and_reference_actors() {
        let id = String::from("user-2");
        let by_ref: &dyn Actor = &&id;
        assert_eq!(by_ref.flipper_id(), "user-2");
    }
}
