//! Graph Identities
//!
//! Reactive objects and effects are addressed by identity, never by value.
//! Two records with identical fields are still two distinct objects in the
//! dependency graph.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::Equivalent;

/// Identity of a reactive object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Generate a new unique object ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Identity of a registered effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl EffectId {
    /// Generate a new unique effect ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EffectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// An `(object, field)` pair: the unit of dependency tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepKey {
    object: ObjectId,
    key: String,
}

impl DepKey {
    pub fn new(object: ObjectId, key: impl Into<String>) -> Self {
        Self {
            object,
            key: key.into(),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

// Hashes exactly like `DepKeyRef` so lookups never allocate a `String`.
impl Hash for DepKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.hash(state);
        self.key.as_str().hash(state);
    }
}

/// Borrowed form of [`DepKey`], used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DepKeyRef<'a> {
    pub(crate) object: ObjectId,
    pub(crate) key: &'a str,
}

impl Hash for DepKeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.hash(state);
        self.key.hash(state);
    }
}

impl Equivalent<DepKey> for DepKeyRef<'_> {
    fn equivalent(&self, key: &DepKey) -> bool {
        self.object == key.object && self.key == key.key
    }
}
