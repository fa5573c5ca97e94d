//! In-memory gate store.
//!
//! This is the reference implementation of [`GateStore`]: other backends
//! must reproduce its merge and removal behavior.

use crate::error::{FlipperError, FlipperResult};
use crate::feature::Feature;
use crate::gates::{Gate, GateKey, GateSet};
use crate::store::GateStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Value persisted for a `(feature, gate)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoredValue {
    Flag,
    Percentage(u32),
    Set(GateSet),
}

/// Gate store keeping every gate in a process-local map.
///
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored `(feature, gate)` values.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Check if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Drop every stored gate.
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, feature: &str, key: GateKey, value: StoredValue) {
        self.data.write().await.insert(build_key(feature, key), value);
    }
}

fn build_key(feature: &str, key: GateKey) -> String {
    format!("feature/{}/{}", feature, key)
}

#[async_trait]
impl GateStore for MemoryStore {
    async fn enable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        let k = build_key(feature.name(), gate.key());
        let mut data = self.data.write().await;

        match gate {
            Gate::Boolean(_) => {
                data.insert(k, StoredValue::Flag);
            }
            Gate::PercentageOfActors(p) | Gate::PercentageOfTime(p) => {
                data.insert(k, StoredValue::Percentage(*p));
            }
            Gate::Actors(members) | Gate::Groups(members) => {
                match data.entry(k).or_insert_with(|| StoredValue::Set(GateSet::new())) {
                    StoredValue::Set(stored) => stored.extend(members.iter().cloned()),
                    other => return Err(FlipperError::unexpected(gate.key(), &*other)),
                }
            }
        }

        Ok(())
    }

    async fn disable(&self, feature: &Feature, gate: &Gate) -> FlipperResult<()> {
        let k = build_key(feature.name(), gate.key());
        let mut data = self.data.write().await;

        match gate {
            Gate::Boolean(_) => {
                data.remove(&k);
            }
            Gate::PercentageOfActors(p) | Gate::PercentageOfTime(p) => {
                data.insert(k, StoredValue::Percentage(*p));
            }
            Gate::Actors(members) | Gate::Groups(members) => match data.get_mut(&k) {
                Some(StoredValue::Set(stored)) => {
                    stored.retain(|m| !members.contains(m));
                    // An emptied set is no gate at all
                    if stored.is_empty() {
                        data.remove(&k);
                    }
                }
                Some(other) => return Err(FlipperError::unexpected(gate.key(), &*other)),
                None => {}
            },
        }

        Ok(())
    }

    async fn get(&self, feature: &Feature, keys: &[GateKey]) -> FlipperResult<Vec<Gate>> {
        let data = self.data.read().await;
        let mut gates = Vec::with_capacity(keys.len());

        for &key in keys {
            let Some(value) = data.get(&build_key(feature.name(), key)) else {
                continue;
            };

            let gate = match (key, value) {
                (GateKey::Boolean, StoredValue::Flag) => Gate::Boolean(true),
                (GateKey::Actors, StoredValue::Set(set)) => Gate::Actors(set.clone()),
                (GateKey::Groups, StoredValue::Set(set)) => Gate::Groups(set.clone()),
                (GateKey::PercentageOfActors, StoredValue::Percentage(p)) => {
                    Gate::PercentageOfActors(*p)
                }
                (GateKey::PercentageOfTime, StoredValue::Percentage(p)) => {
                    Gate::PercentageOfTime(*p)
                }
                (key, other) => return Err(FlipperError::unexpected(key, other)),
            };
            gates.push(gate);
        }

        Ok(gates)
    }
}
