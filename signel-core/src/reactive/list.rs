//! Reactive List Implementation
//!
//! A `ReactiveList` is the array flavor of the reactive protocol. It does not
//! use the dependency store at all: subscribers register explicitly and every
//! mutation notifies every subscriber, passing the list itself.
//!
//! # Why Notify-All
//!
//! Rendering a collection almost always depends on the whole collection, so
//! per-index tracking would buy nothing. Unlike `ReactiveObject::set`, there
//! is no equality check either: a mutation notifies even when it leaves the
//! contents unchanged (popping an empty list, assigning an equal element).
//!
//! # Notification Order
//!
//! Subscribers run synchronously, in registration order, once per mutating
//! call. The subscriber set is snapshotted when the notification starts: a
//! subscriber added during a notification is not called for it, and one
//! removed during a notification is skipped if it has not run yet.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;

use crate::error::{Error, Result};

use super::subscriber::{Subscription, SubscriptionId};

type Callback<T> = Arc<dyn Fn(&ReactiveList<T>) + Send + Sync>;
type Subscribers<T> = Mutex<IndexMap<SubscriptionId, Callback<T>>>;

/// A vector whose mutations notify subscribers.
///
/// Cloning the list yields another handle to the same items and subscribers.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use signel_core::reactive::ReactiveList;
///
/// let list = ReactiveList::new(vec![1, 2, 3]);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// list.subscribe(move |items| sink.lock().unwrap().push(items.len()));
/// list.set(0, 9).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![3, 3]);
/// ```
pub struct ReactiveList<T> {
    items: Arc<RwLock<Vec<T>>>,
    subscribers: Arc<Subscribers<T>>,
}

impl<T> ReactiveList<T>
where
    T: Send + Sync + 'static,
{
    /// Create a list holding `initial`.
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(Mutex::new(IndexMap::new())),
        }
    }

    /// Register `f`, call it once right away with the current list, and
    /// return the capability to unregister it.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&ReactiveList<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let callback: Callback<T> = Arc::new(f);
        self.subscribers.lock().insert(id, Arc::clone(&callback));

        tracing::debug!(subscription = ?id, "list subscriber added");

        let subscribers = Arc::downgrade(&self.subscribers);
        let subscription = Subscription::new(id, move |id| match subscribers.upgrade() {
            Some(subscribers) => {
                let removed = subscribers.lock().shift_remove(&id).is_some();
                tracing::debug!(subscription = ?id, removed, "list subscriber removed");
                removed
            }
            None => false,
        });

        callback(self);
        subscription
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Call every subscriber with this list.
    fn notify(&self) {
        let snapshot: SmallVec<[(SubscriptionId, Callback<T>); 4]> = self
            .subscribers
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        tracing::debug!(subscribers = snapshot.len(), "notifying list subscribers");

        for (id, callback) in snapshot {
            if !self.subscribers.lock().contains_key(&id) {
                continue;
            }
            callback(self);
        }
    }

    /// Apply `f` to the items, then notify. The lock is released before any
    /// subscriber runs.
    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let result = {
            let mut items = self.items.write();
            f(&mut *items)
        };
        self.notify();
        result
    }

    /// Assign the element at `index`.
    ///
    /// Assigning at `index == len` appends. Anything past that fails with
    /// [`Error::IndexOutOfBounds`] and notifies nobody.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        {
            let mut items = self.items.write();
            let len = items.len();
            match index.cmp(&len) {
                std::cmp::Ordering::Less => items[index] = value,
                std::cmp::Ordering::Equal => items.push(value),
                std::cmp::Ordering::Greater => {
                    return Err(Error::IndexOutOfBounds { index, len });
                }
            }
        }

        self.notify();
        Ok(())
    }

    /// Append an element.
    pub fn push(&self, value: T) {
        self.mutate(|items| items.push(value));
    }

    /// Remove and return the last element. Notifies even when empty.
    pub fn pop(&self) -> Option<T> {
        self.mutate(Vec::pop)
    }

    /// Insert an element at `index`, shifting later elements right.
    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        {
            let mut items = self.items.write();
            let len = items.len();
            if index > len {
                return Err(Error::IndexOutOfBounds { index, len });
            }
            items.insert(index, value);
        }

        self.notify();
        Ok(())
    }

    /// Remove and return the element at `index`, shifting later elements left.
    pub fn remove(&self, index: usize) -> Result<T> {
        let removed = {
            let mut items = self.items.write();
            let len = items.len();
            if index >= len {
                return Err(Error::IndexOutOfBounds { index, len });
            }
            items.remove(index)
        };

        self.notify();
        Ok(removed)
    }

    /// Shorten the list to `len` elements. Notifies even if nothing was cut.
    pub fn truncate(&self, len: usize) {
        self.mutate(|items| items.truncate(len));
    }

    /// Remove every element.
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Swap in new contents, returning the old ones.
    pub fn replace(&self, items: Vec<T>) -> Vec<T> {
        self.mutate(|current| std::mem::replace(current, items))
    }

    /// Mutate the underlying vector in place. Notifies once, afterwards.
    ///
    /// # Deadlocks
    ///
    /// The write lock is held while `f` runs, so `f` must not touch this list
    /// (or a clone of it) in any way. Subscribers run after the lock is
    /// released and may read or mutate the list freely.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.mutate(f)
    }

    /// Read the items without copying them.
    ///
    /// # Deadlocks
    ///
    /// A read lock is held while `f` runs. Reading the list again from `f`
    /// is fine; mutating it from `f` deadlocks.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.items.read_recursive().as_slice())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T> ReactiveList<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Set the length: truncate, or pad with copies of `fill`.
    pub fn resize(&self, len: usize, fill: T) {
        self.mutate(|items| items.resize(len, fill));
    }

    /// Copy of the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Copy of all elements.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }
}

impl<T> Clone for ReactiveList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> From<Vec<T>> for ReactiveList<T>
where
    T: Send + Sync + 'static,
{
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for ReactiveList<T>
where
    T: Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> Default for ReactiveList<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> fmt::Debug for ReactiveList<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveList")
            .field("items", &*self.items.read())
            .field("subscriber_count", &self.subscribers.lock().len())
            .finish()
    }
}
