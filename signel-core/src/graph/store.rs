//! Dependency Store
//!
//! The store maps every `(object, field)` pair to the set of effects that read
//! it. It is plain data: inserting an edge, looking up the dependents of a
//! pair and, for refresh tracking and disposal, dropping all edges of one
//! effect.
//!
//! # Layout
//!
//! Two indexes are kept in sync:
//!
//! - `dependents`: pair -> effects (the forward index `trigger` walks)
//! - `dependencies`: effect -> pairs (the reverse index used to untrack)
//!
//! Both use insertion-ordered sets, so the order in which a write re-runs its
//! dependents is the order in which they first read the field.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use super::ids::{DepKey, DepKeyRef, EffectId, ObjectId};

/// Effects collected for one trigger. Most fields have a handful of readers.
pub type Dependents = SmallVec<[EffectId; 4]>;

/// Registry of `(object, field)` -> dependent effects.
#[derive(Debug, Default)]
pub struct DependencyStore {
    dependents: IndexMap<DepKey, IndexSet<EffectId>>,
    dependencies: IndexMap<EffectId, IndexSet<DepKey>>,
}

impl DependencyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `effect` read `key` on `object`.
    ///
    /// Idempotent. Returns `true` if the edge did not exist before.
    pub fn track(&mut self, object: ObjectId, key: &str, effect: EffectId) -> bool {
        let lookup = DepKeyRef { object, key };

        let inserted = match self.dependents.get_mut(&lookup) {
            Some(effects) => effects.insert(effect),
            None => {
                let mut effects = IndexSet::new();
                effects.insert(effect);
                self.dependents.insert(DepKey::new(object, key), effects);
                true
            }
        };

        if inserted {
            self.dependencies
                .entry(effect)
                .or_default()
                .insert(DepKey::new(object, key));
        }

        inserted
    }

    /// Snapshot the effects that depend on `key` of `object`.
    ///
    /// The snapshot is detached from the store, so the caller may run the
    /// effects while they add (or, in refresh mode, remove) edges.
    pub fn dependents(&self, object: ObjectId, key: &str) -> Dependents {
        self.dependents
            .get(&DepKeyRef { object, key })
            .map(|effects| effects.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Check whether `effect` currently depends on `key` of `object`.
    pub fn is_tracked(&self, object: ObjectId, key: &str, effect: EffectId) -> bool {
        self.dependents
            .get(&DepKeyRef { object, key })
            .is_some_and(|effects| effects.contains(&effect))
    }

    /// Remove every edge held by `effect`.
    ///
    /// Returns the number of edges removed.
    pub fn untrack_effect(&mut self, effect: EffectId) -> usize {
        let Some(keys) = self.dependencies.shift_remove(&effect) else {
            return 0;
        };

        for key in &keys {
            let now_empty = match self.dependents.get_mut(key) {
                Some(effects) => {
                    effects.shift_remove(&effect);
                    effects.is_empty()
                }
                None => false,
            };

            if now_empty {
                self.dependents.shift_remove(key);
            }
        }

        keys.len()
    }

    /// Number of `(object, field)` pairs `effect` depends on.
    pub fn dependency_count(&self, effect: EffectId) -> usize {
        self.dependencies.get(&effect).map_or(0, IndexSet::len)
    }

    /// Number of `(object, field)` pairs with at least one dependent.
    pub fn key_count(&self) -> usize {
        self.dependents.len()
    }

    /// Total number of edges in the store.
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(IndexSet::len).sum()
    }
}
