//! Reactivity Context
//!
//! The context owns everything the tracking protocol needs: the dependency
//! store, the registry of live effects and the active effect slot. Objects and
//! effects created from one context never interact with another context.
//!
//! # Protocol
//!
//! - **track**: a field read while an effect is active records the edge
//!   `(object, field) -> effect`.
//! - **trigger**: a value-changing write snapshots the dependents of
//!   `(object, field)` and runs each one to completion, in order, before the
//!   write returns.
//!
//! # Active Effect Slot
//!
//! Running an effect swaps it into the slot and a guard swaps the previous
//! occupant back when the run ends, even if the effect panics. Nested runs
//! therefore hand the slot back to the outer effect instead of clearing it.
//!
//! # Cycles
//!
//! An effect that writes a field it (transitively) depends on re-triggers
//! itself. Nothing detects this: a genuine write-write cycle recurses until
//! the stack overflows. Writing back an unchanged value is safe, since equal
//! writes never trigger.
//!
//! # Lifetime
//!
//! Effects usually capture the objects they read, objects hold the context
//! and the context holds its effects. That cycle keeps a context alive until
//! its effects are disposed.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::{json_kind, Error, Result};
use crate::graph::{DependencyStore, EffectId, ObjectId};

use super::config::{ContextConfig, TrackingMode};
use super::effect::{Effect, EffectHandle};
use super::list::ReactiveList;
use super::object::ReactiveObject;

/// Shared state behind a [`ReactivityContext`].
pub(crate) struct ContextInner {
    config: ContextConfig,
    store: Mutex<DependencyStore>,
    effects: Mutex<IndexMap<EffectId, Effect>>,
    active: Mutex<Option<Effect>>,
}

/// Restores the active effect slot when dropped.
///
/// This keeps the slot consistent even if the effect panics.
struct ActiveEffectGuard<'a> {
    slot: &'a Mutex<Option<Effect>>,
    previous: Option<Effect>,
}

impl<'a> ActiveEffectGuard<'a> {
    fn enter(slot: &'a Mutex<Option<Effect>>, effect: Option<Effect>) -> Self {
        let previous = std::mem::replace(&mut *slot.lock(), effect);
        Self { slot, previous }
    }
}

impl Drop for ActiveEffectGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = self.previous.take();
    }
}

impl ContextInner {
    fn new(config: ContextConfig) -> Self {
        Self {
            config,
            store: Mutex::new(DependencyStore::new()),
            effects: Mutex::new(IndexMap::new()),
            active: Mutex::new(None),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.config.name
    }

    /// Record that the active effect, if any, read `key` on `object`.
    pub(crate) fn track(&self, object: ObjectId, key: &str) {
        // An effect disposed mid-run keeps the slot until it returns, but its
        // later reads must not re-create edges `dispose` already removed.
        let Some(effect) = self
            .active
            .lock()
            .as_ref()
            .filter(|effect| !effect.is_disposed())
            .map(Effect::id)
        else {
            return;
        };

        if self.store.lock().track(object, key, effect) {
            tracing::trace!(
                context = %self.config.name,
                %object,
                key,
                %effect,
                "tracked dependency"
            );
        }
    }

    /// Re-run every effect that depends on `key` of `object`.
    pub(crate) fn trigger(&self, object: ObjectId, key: &str) {
        let dependents = self.store.lock().dependents(object, key);
        if dependents.is_empty() {
            return;
        }

        let effects: SmallVec<[Effect; 4]> = {
            let registry = self.effects.lock();
            dependents
                .iter()
                .filter_map(|id| registry.get(id).cloned())
                .collect()
        };

        tracing::debug!(
            context = %self.config.name,
            %object,
            key,
            dependents = effects.len(),
            "triggering dependents"
        );

        for effect in &effects {
            self.execute(effect);
        }
    }

    /// Run `effect` as the active effect.
    pub(crate) fn execute(&self, effect: &Effect) {
        if effect.is_disposed() {
            return;
        }

        if self.config.tracking == TrackingMode::Refresh {
            self.store.lock().untrack_effect(effect.id());
        }

        let _guard = ActiveEffectGuard::enter(&self.active, Some(effect.clone()));
        effect.invoke();

        tracing::debug!(
            context = %self.config.name,
            effect = %effect.id(),
            run_count = effect.run_count(),
            "effect ran"
        );
    }

    pub(crate) fn dispose(&self, effect: &Effect) {
        if !effect.mark_disposed() {
            return;
        }

        self.effects.lock().shift_remove(&effect.id());
        let removed = self.store.lock().untrack_effect(effect.id());

        tracing::debug!(
            context = %self.config.name,
            effect = %effect.id(),
            edges = removed,
            "effect disposed"
        );
    }

    pub(crate) fn dependency_count(&self, effect: EffectId) -> usize {
        self.store.lock().dependency_count(effect)
    }
}

/// An isolated reactive world: the factory for reactive objects and the runner
/// for effects.
///
/// Cloning a context is cheap and yields another handle to the same state.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use serde_json::json;
/// use signel_core::reactive::ReactivityContext;
///
/// let ctx = ReactivityContext::new();
/// let state = ctx.wrap([("count", 0)]);
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let effect_state = state.clone();
/// let effect_log = log.clone();
/// ctx.run(move || effect_log.lock().unwrap().push(effect_state.get("count")));
///
/// state.set("count", 1);
/// state.set("count", 1);
/// state.set("count", 2);
///
/// assert_eq!(*log.lock().unwrap(), vec![json!(0), json!(1), json!(2)]);
/// ```
#[derive(Clone)]
pub struct ReactivityContext {
    inner: Arc<ContextInner>,
}

impl ReactivityContext {
    /// Create a context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Create a context with the given configuration.
    pub fn with_config(config: ContextConfig) -> Self {
        tracing::debug!(
            context = %config.name,
            tracking = ?config.tracking,
            "reactivity context created"
        );

        Self {
            inner: Arc::new(ContextInner::new(config)),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ContextInner>) -> Self {
        Self { inner }
    }

    /// The configuration this context was built with.
    pub fn config(&self) -> &ContextConfig {
        &self.inner.config
    }

    /// Wrap a record of named fields.
    pub fn wrap<I, K, V>(&self, fields: I) -> ReactiveObject
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        ReactiveObject::new(Arc::clone(&self.inner), fields)
    }

    /// Wrap a JSON object.
    ///
    /// Fails with [`Error::NotAnObject`] for any other kind of value.
    pub fn wrap_value(&self, value: Value) -> Result<ReactiveObject> {
        match value {
            Value::Object(map) => Ok(self.wrap(map)),
            other => Err(Error::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Wrap any value that serializes to a map, such as a plain struct.
    pub fn wrap_serialize<T>(&self, value: &T) -> Result<ReactiveObject>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(Error::Serialize)?;
        self.wrap_value(value)
    }

    /// Create a reactive list next to this context's objects.
    ///
    /// Lists notify through their own subscribers and never enter the
    /// dependency store, so the list is independent of the context; this is
    /// [`ReactiveList::new`] for callers that only hold a context, plus a log
    /// event naming the context that asked for it.
    pub fn make_list<T>(&self, initial: Vec<T>) -> ReactiveList<T>
    where
        T: Send + Sync + 'static,
    {
        tracing::trace!(
            context = %self.inner.config.name,
            len = initial.len(),
            "reactive list created"
        );
        ReactiveList::new(initial)
    }

    /// Run `effect` now and again after every change to a field it read.
    ///
    /// The previous active effect is restored afterwards, so `run` may be
    /// called from inside another effect. If `effect` panics, the panic
    /// propagates after the slot is restored.
    pub fn run<F>(&self, effect: F) -> EffectHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let effect = Effect::new(effect);
        self.inner
            .effects
            .lock()
            .insert(effect.id(), effect.clone());

        let handle = EffectHandle::new(effect.clone(), &self.inner);
        self.inner.execute(&effect);
        handle
    }

    /// Run `f` with no active effect, so its reads record nothing.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = ActiveEffectGuard::enter(&self.inner.active, None);
        f()
    }

    /// The effect currently being tracked, if any.
    pub fn active_effect(&self) -> Option<EffectId> {
        self.inner.active.lock().as_ref().map(Effect::id)
    }

    /// Check if reads are currently being tracked.
    pub fn is_tracking(&self) -> bool {
        self.inner.active.lock().is_some()
    }

    /// Effects that would re-run after a change to `key` of `object`.
    pub fn dependents(&self, object: &ReactiveObject, key: &str) -> Vec<EffectId> {
        self.inner
            .store
            .lock()
            .dependents(object.id(), key)
            .into_vec()
    }

    /// Number of live (not disposed) effects.
    pub fn effect_count(&self) -> usize {
        self.inner.effects.lock().len()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.inner.store.lock().edge_count()
    }

    /// Check whether two handles refer to the same context.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ReactivityContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReactivityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactivityContext")
            .field("name", &self.inner.config.name)
            .field("tracking", &self.inner.config.tracking)
            .field("effect_count", &self.effect_count())
            .field("edge_count", &self.edge_count())
            .finish()
    }
}
