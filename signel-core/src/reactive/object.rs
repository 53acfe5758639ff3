//! Reactive Object Implementation
//!
//! A `ReactiveObject` is a record of named fields whose reads and writes go
//! through accessor methods instead of plain field syntax.
//!
//! # How Reactive Objects Work
//!
//! 1. `get` registers the active effect, if any, as a dependent of
//!    `(object, field)` and returns the stored value.
//!
//! 2. `set` compares the new value with the stored one. An equal value is a
//!    no-op: nothing is stored and nobody is notified. This is what keeps an
//!    effect that writes back the value it just read from looping.
//!
//! 3. A different value is stored and every dependent of `(object, field)`
//!    re-runs before `set` returns.
//!
//! Enumeration (`keys`, `len`, ...) and deletion (`remove`) neither track nor
//! trigger.
//!
//! # Identity
//!
//! Cloning a `ReactiveObject` yields another handle to the same object.
//! Equality between handles is identity: two objects wrapping equal records
//! are still different objects and are tracked independently.
//!
//! # Values
//!
//! Fields hold `serde_json::Value`s and the change check is structural, with
//! one exception: numbers compare by numeric value, so `1` and `1.0` are the
//! same value even though `Value`'s own `PartialEq` tells them apart. This
//! applies inside arrays and nested records too. A field that does not exist
//! reads as `Value::Null`; writing any value to it, `Null` included, creates
//! the field and counts as a change.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::graph::ObjectId;

use super::context::{ContextInner, ReactivityContext};

/// A tracked record, created by [`ReactivityContext::wrap`].
///
/// # Example
///
/// ```rust
/// use signel_core::reactive::ReactivityContext;
///
/// let ctx = ReactivityContext::new();
/// let user = ctx.wrap([("name", "Ada")]);
///
/// assert_eq!(user.get("name"), "Ada");
/// assert!(user.set("name", "Grace"));
/// assert!(!user.set("name", "Grace"));
/// ```
#[derive(Clone)]
pub struct ReactiveObject {
    /// Identity used as the dependency store key.
    id: ObjectId,

    /// Field storage, shared by all clones of this handle.
    fields: Arc<RwLock<IndexMap<String, Value>>>,

    /// The context that tracks and triggers on behalf of this object.
    context: Arc<ContextInner>,
}

impl ReactiveObject {
    pub(crate) fn new(context: Arc<ContextInner>, fields: IndexMap<String, Value>) -> Self {
        let object = Self {
            id: ObjectId::new(),
            fields: Arc::new(RwLock::new(fields)),
            context,
        };

        tracing::trace!(
            context = object.context.name(),
            object = %object.id,
            "reactive object created"
        );

        object
    }

    /// Get the object's identity.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The context this object belongs to.
    pub fn context(&self) -> ReactivityContext {
        ReactivityContext::from_inner(Arc::clone(&self.context))
    }

    /// Read a field.
    ///
    /// If called while an effect is running, this also registers that effect
    /// as a dependent of the field, whether or not the field exists.
    pub fn get(&self, key: &str) -> Value {
        self.context.track(self.id, key);
        self.get_untracked(key)
    }

    /// Read a field and decode it into `T`.
    ///
    /// Tracks exactly like [`get`](Self::get).
    pub fn get_as<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.get(key)).map_err(|source| Error::Deserialize {
            key: key.to_owned(),
            source,
        })
    }

    /// Read a field without registering a dependency.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.fields.read().get(key).cloned().unwrap_or(Value::Null)
    }

    /// Write a field.
    ///
    /// Returns `false` without notifying anyone if `value` equals the stored
    /// value. Otherwise stores it, re-runs every dependent effect and returns
    /// `true`. A panic in a dependent effect propagates out of this call.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();

        {
            let mut fields = self.fields.write();
            match fields.get_mut(key) {
                Some(current) if same_value(current, &value) => return false,
                Some(current) => *current = value,
                None => {
                    fields.insert(key.to_owned(), value);
                }
            }
        }

        self.context.trigger(self.id, key);
        true
    }

    /// Compute a new value from the current one and [`set`](Self::set) it.
    ///
    /// The current value is read without tracking.
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&Value) -> Value,
    {
        let next = f(&self.get_untracked(key));
        self.set(key, next)
    }

    /// Delete a field, returning its value. Does not notify dependents.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.fields.write().shift_remove(key)
    }

    /// Check whether a field exists. Does not track.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.read().contains_key(key)
    }

    /// Field names in insertion order. Does not track.
    pub fn keys(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Check whether the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }

    /// Copy the whole record out as a JSON object, without tracking.
    pub fn snapshot(&self) -> Value {
        let fields = self.fields.read();
        let map: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Object(map)
    }

    /// Decode the whole record into `T`, without tracking.
    pub fn deserialize<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.snapshot()).map_err(Error::Decode)
    }
}

impl PartialEq for ReactiveObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReactiveObject {}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("id", &self.id)
            .field("fields", &*self.fields.read())
            .finish()
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`).
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn get_and_set() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 0)]);
        assert_eq!(state.get("count"), 0);

        assert!(state.set("count", 42));
        assert_eq!(state.get("count"), 42);
    }

    #[test]
    fn missing_field_reads_null() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap(Vec::<(String, Value)>::new());

        assert_eq!(state.get("nope"), Value::Null);
        assert!(state.is_empty());
    }

    #[test]
    fn writing_missing_field_creates_it() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("a", 1)]);

        assert!(state.set("b", Value::Null));
        assert!(state.contains_key("b"));
        assert_eq!(state.keys(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn numerically_equal_write_is_unchanged() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 1)]);
        let runs = Arc::new(AtomicI32::new(0));

        {
            let state = state.clone();
            let runs = runs.clone();
            ctx.run(move || {
                state.get("count");
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(!state.set("count", 1.0));
        assert_eq!(state.get("count"), json!(1));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert!(state.set("count", 1.5));
        assert!(!state.set("count", 1.5));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn nested_values_compare_numbers_by_value() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("point", json!({ "x": 2, "tags": [1, 2] }))]);

        assert!(!state.set("point", json!({ "tags": [1.0, 2.0], "x": 2.0 })));
        assert!(state.set("point", json!({ "x": 2, "tags": [1, 2, 3] })));
        assert!(state.set("point", json!({ "x": 2, "y": 0 })));
        assert!(state.set("point", json!([2])));
        assert!(!state.set("point", json!([2.0])));
        assert!(state.set("point", json!(["2"])));
    }

    #[test]
    fn update_applies_function() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 10)]);

        assert!(state.update("count", |v| json!(v.as_i64().unwrap_or(0) + 5)));
        assert_eq!(state.get("count"), 15);

        assert!(!state.update("count", |v| v.clone()));
    }

    #[test]
    fn clone_shares_state() {
        let ctx = ReactivityContext::new();
        let first = ctx.wrap([("count", 0)]);
        let second = first.clone();

        first.set("count", 42);
        assert_eq!(second.get("count"), 42);
        assert_eq!(first, second);
    }

    #[test]
    fn equal_records_are_distinct_objects() {
        let ctx = ReactivityContext::new();
        let a = ctx.wrap([("count", 0)]);
        let b = ctx.wrap([("count", 0)]);

        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn remove_does_not_trigger() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 0)]);
        let runs = Arc::new(AtomicI32::new(0));

        {
            let state = state.clone();
            let runs = runs.clone();
            ctx.run(move || {
                state.get("count");
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(state.remove("count"), Some(json!(0)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Re-adding the field is a change.
        state.set("count", 0);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn typed_reads() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Todo {
            title: String,
            done: bool,
        }

        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("title", json!("write tests")), ("done", json!(false))]);

        assert!(!state.get_as::<bool>("done").unwrap());
        assert!(matches!(
            state.get_as::<u32>("title"),
            Err(Error::Deserialize { ref key, .. }) if key == "title"
        ));

        let todo: Todo = state.deserialize().unwrap();
        assert_eq!(
            todo,
            Todo {
                title: "write tests".to_owned(),
                done: false,
            }
        );
    }

    #[test]
    fn context_handle_points_back() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 0)]);
        assert!(state.context().ptr_eq(&ctx));
    }
}
