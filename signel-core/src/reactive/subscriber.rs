//! Subscription types for reactive lists.
//!
//! A list subscriber is a callback registered with
//! [`ReactiveList::subscribe`](super::ReactiveList::subscribe). The returned
//! [`Subscription`] is the capability to remove that one registration.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a list subscription.
///
/// Each call to `subscribe` gets a fresh ID, so subscribing the same callback
/// twice yields two independent registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Generate a new unique subscription ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability to cancel one list subscription.
///
/// Dropping a `Subscription` leaves the subscriber registered; only
/// [`unsubscribe`](Self::unsubscribe) removes it.
pub struct Subscription {
    id: SubscriptionId,
    /// Removes the registration. Returns whether it was still present.
    detach: Box<dyn FnOnce(SubscriptionId) -> bool + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new<F>(id: SubscriptionId, detach: F) -> Self
    where
        F: FnOnce(SubscriptionId) -> bool + Send + Sync + 'static,
    {
        Self {
            id,
            detach: Box::new(detach),
        }
    }

    /// Get the subscription's unique ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove exactly this registration from its list.
    ///
    /// Returns `false` if the list no longer exists or the registration was
    /// already gone.
    pub fn unsubscribe(self) -> bool {
        (self.detach)(self.id)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
