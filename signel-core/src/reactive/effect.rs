//! Effect Implementation
//!
//! An Effect is a side-effecting function that reads reactive fields and is
//! re-run whenever one of those fields changes.
//!
//! # How Effects Work
//!
//! 1. `ReactivityContext::run` registers the function and runs it once. Every
//!    field read during that run records the effect as a dependent.
//!
//! 2. A write that changes a field re-runs every dependent effect, in place,
//!    before the write returns.
//!
//! 3. Re-runs go through the same protocol as the first run, so they track
//!    too. Whether old edges survive a re-run depends on the context's
//!    [`TrackingMode`](super::TrackingMode).
//!
//! # Failure
//!
//! A panicking effect unwinds through whoever ran it (`run`, `execute` or the
//! triggering write). The active effect slot is restored on the way out.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use crate::graph::EffectId;

use super::context::ContextInner;

/// The registered form of an effect, shared between the registry, the active
/// slot and any handles.
#[derive(Clone)]
pub(crate) struct Effect {
    inner: Arc<EffectInner>,
}

struct EffectInner {
    id: EffectId,
    run: Box<dyn Fn() + Send + Sync>,
    run_count: AtomicUsize,
    disposed: AtomicBool,
}

impl Effect {
    pub(crate) fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(EffectInner {
                id: EffectId::new(),
                run: Box::new(run),
                run_count: AtomicUsize::new(0),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn id(&self) -> EffectId {
        self.inner.id
    }

    /// Call the user function. Tracking is the caller's concern.
    pub(crate) fn invoke(&self) {
        self.inner.run_count.fetch_add(1, Ordering::SeqCst);
        (self.inner.run)();
    }

    pub(crate) fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Mark the effect disposed. Returns `false` if it already was.
    pub(crate) fn mark_disposed(&self) -> bool {
        !self.inner.disposed.swap(true, Ordering::SeqCst)
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Handle to an effect registered with [`ReactivityContext::run`].
///
/// Dropping the handle does **not** stop the effect: like the callback passed
/// to `run`, the effect lives as long as its context. Call
/// [`dispose`](Self::dispose) to detach it.
///
/// [`ReactivityContext::run`]: super::ReactivityContext::run
#[derive(Clone)]
pub struct EffectHandle {
    effect: Effect,
    context: Weak<ContextInner>,
}

impl EffectHandle {
    pub(crate) fn new(effect: Effect, context: &Arc<ContextInner>) -> Self {
        Self {
            effect,
            context: Arc::downgrade(context),
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> EffectId {
        self.effect.id()
    }

    /// Number of times the effect has run, including the initial run.
    pub fn run_count(&self) -> usize {
        self.effect.run_count()
    }

    /// Number of `(object, field)` pairs the effect currently depends on.
    pub fn dependency_count(&self) -> usize {
        self.context
            .upgrade()
            .map_or(0, |context| context.dependency_count(self.id()))
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.effect.is_disposed()
    }

    /// Re-run the effect now, with tracking.
    ///
    /// Does nothing once the effect is disposed or its context is gone.
    pub fn execute(&self) {
        if let Some(context) = self.context.upgrade() {
            context.execute(&self.effect);
        }
    }

    /// Detach the effect from every field it depends on.
    ///
    /// After disposal the effect never runs again, even if a trigger already
    /// in progress had it queued.
    pub fn dispose(&self) {
        match self.context.upgrade() {
            Some(context) => context.dispose(&self.effect),
            None => {
                self.effect.mark_disposed();
            }
        }
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectHandle")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    use crate::reactive::ReactivityContext;

    #[test]
    fn effect_runs_on_creation() {
        let ctx = ReactivityContext::new();
        let run_count = Arc::new(AtomicI32::new(0));
        let run_count_clone = run_count.clone();

        let effect = ctx.run(move || {
            run_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(run_count.load(Ordering::SeqCst), 1);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn execute_reruns_effect() {
        let ctx = ReactivityContext::new();
        let effect = ctx.run(|| {});

        effect.execute();
        effect.execute();
        assert_eq!(effect.run_count(), 3);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let ctx = ReactivityContext::new();
        let state = ctx.wrap([("count", 0)]);
        let run_count = Arc::new(AtomicI32::new(0));

        let effect = {
            let state = state.clone();
            let run_count = run_count.clone();
            ctx.run(move || {
                state.get("count");
                run_count.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(effect.dependency_count(), 1);

        effect.dispose();
        assert!(effect.is_disposed());
        assert_eq!(effect.dependency_count(), 0);

        state.set("count", 1);
        effect.execute();
        assert_eq!(run_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_clone_shares_state() {
        let ctx = ReactivityContext::new();
        let first = ctx.run(|| {});
        let second = first.clone();

        assert_eq!(first.id(), second.id());

        first.execute();
        assert_eq!(second.run_count(), 2);

        second.dispose();
        assert!(first.is_disposed());
    }

    #[test]
    fn handle_outliving_context_is_inert() {
        let effect = {
            let ctx = ReactivityContext::new();
            ctx.run(|| {})
        };

        effect.execute();
        assert_eq!(effect.run_count(), 1);
        assert_eq!(effect.dependency_count(), 0);

        effect.dispose();
        assert!(effect.is_disposed());
    }
}
