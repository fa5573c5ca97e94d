//! Gate variants and their open predicates.
//!
//! A feature is composed of up to five independently persisted gates:
//!
//! | Gate | Stored value | Open when |
//! |---|---|---|
//! | `boolean` | `bool` | the value is `true` |
//! | `actors` | set of actor ids | the actor id is in the set |
//! | `groups` | set of group names | a registered group predicate matches the actor |
//! | `percentage_of_actors` | `0..=100` | the (feature, actor) checksum falls under the percentage |
//! | `percentage_of_time` | `0..=100` | a random draw falls under the percentage |

use crate::actor::Actor;
use crate::error::FlipperError;
use crate::feature::{Feature, FeaturedActor};
use crate::groups::GroupRegistry;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Resolution of a percentage point.
pub const SCALING_FACTOR: u32 = 1000;

/// Number of percentage points.
pub const RANGE_FACTOR: u32 = 100;

/// Set of actor ids or group names.
pub type GateSet = BTreeSet<String>;

/// Build a [`GateSet`] from any list of strings.
pub fn gate_set<I, S>(values: I) -> GateSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// Stable identifier of a gate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKey {
    Boolean,
    Actors,
    Groups,
    PercentageOfActors,
    PercentageOfTime,
}

impl GateKey {
    /// Every gate key, in evaluation order.
    pub const ALL: [GateKey; 5] = [
        GateKey::Boolean,
        GateKey::Actors,
        GateKey::Groups,
        GateKey::PercentageOfActors,
        GateKey::PercentageOfTime,
    ];

    /// Key as persisted by stores.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateKey::Boolean => "boolean",
            GateKey::Actors => "actors",
            GateKey::Groups => "groups",
            GateKey::PercentageOfActors => "percentage_of_actors",
            GateKey::PercentageOfTime => "percentage_of_time",
        }
    }
}

impl fmt::Display for GateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateKey {
    type Err = FlipperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(GateKey::Boolean),
            "actors" => Ok(GateKey::Actors),
            "groups" => Ok(GateKey::Groups),
            "percentage_of_actors" => Ok(GateKey::PercentageOfActors),
            "percentage_of_time" => Ok(GateKey::PercentageOfTime),
            other => Err(FlipperError::UnsupportedGate(other.to_string())),
        }
    }
}

/// A single feature constraint together with its persisted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Open for everybody when `true`.
    Boolean(bool),
    /// Open for the listed actor ids.
    Actors(GateSet),
    /// Open for actors matching any of the listed groups.
    Groups(GateSet),
    /// Open for a stable percentage of actors.
    PercentageOfActors(u32),
    /// Open for a percentage of checks.
    PercentageOfTime(u32),
}

impl Gate {
    pub fn actors<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Gate::Actors(gate_set(ids))
    }

    pub fn groups<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Gate::Groups(gate_set(names))
    }

    /// Key identifying this gate's kind.
    pub fn key(&self) -> GateKey {
        match self {
            Gate::Boolean(_) => GateKey::Boolean,
            Gate::Actors(_) => GateKey::Actors,
            Gate::Groups(_) => GateKey::Groups,
            Gate::PercentageOfActors(_) => GateKey::PercentageOfActors,
            Gate::PercentageOfTime(_) => GateKey::PercentageOfTime,
        }
    }

    /// Check if the gate is open for a feature and an optional actor.
    ///
    /// Actor-scoped gates (actors, groups, percentage of actors) are always
    /// closed when no actor is given.
    pub fn is_open(
        &self,
        feature: &Feature,
        actor: Option<&dyn Actor>,
        groups: &GroupRegistry,
    ) -> bool {
        match self {
            Gate::Boolean(value) => *value,
            Gate::Actors(ids) => actor.is_some_and(|a| ids.contains(a.flipper_id())),
            Gate::Groups(names) => actor.is_some_and(|a| {
                names
                    .iter()
                    .any(|name| groups.matches(name, a).unwrap_or(false))
            }),
            Gate::PercentageOfActors(percentage) => actor.is_some_and(|a| {
                let bucket = checksum(&FeaturedActor::new(feature, a));
                bucket < percentage.saturating_mul(SCALING_FACTOR)
            }),
            Gate::PercentageOfTime(percentage) => {
                let draw = rand::rng().random_range(0..SCALING_FACTOR * RANGE_FACTOR);
                draw < percentage.saturating_mul(SCALING_FACTOR)
            }
        }
    }

    /// Boolean value, for boolean gates.
    pub fn bool_value(&self) -> Option<bool> {
        match self {
            Gate::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Member set, for actor and group gates.
    pub fn set_value(&self) -> Option<&GateSet> {
        match self {
            Gate::Actors(set) | Gate::Groups(set) => Some(set),
            _ => None,
        }
    }

    /// Stored percentage, for percentage gates.
    pub fn percentage(&self) -> Option<u32> {
        match self {
            Gate::PercentageOfActors(p) | Gate::PercentageOfTime(p) => Some(*p),
            _ => None,
        }
    }
}

/// CRC-32 (IEEE) of the actor id reduced to `0..SCALING_FACTOR * RANGE_FACTOR`.
pub fn checksum(actor: &dyn Actor) -> u32 {
    crc32fast::hash(actor.flipper_id().as_bytes()) % (SCALING_FACTOR * RANGE_FACTOR)
}
