//! Reactive Primitives
//!
//! This module implements the user-facing side of the kernel: reactive
//! objects, effects and reactive lists, all created from a
//! [`ReactivityContext`].
//!
//! # Concepts
//!
//! ## Reactive Objects
//!
//! A [`ReactiveObject`] is a record of named fields accessed through `get` and
//! `set`. Reading a field while an effect runs subscribes that effect to the
//! field; writing a different value re-runs the subscribers.
//!
//! ## Effects
//!
//! An effect is a side-effecting closure passed to [`ReactivityContext::run`].
//! It runs once immediately and again after every change to a field it read.
//! Nobody declares dependencies by hand.
//!
//! ## Reactive Lists
//!
//! A [`ReactiveList`] is the collection variant. It skips dependency tracking
//! entirely: subscribers register explicitly and every mutation notifies all
//! of them.
//!
//! # Implementation Notes
//!
//! Tracking relies on the context's active effect slot. When a field is read,
//! we check whether an effect is running and, if so, record the dependency in
//! the context's [`DependencyStore`](crate::graph::DependencyStore).
//!
//! Everything is synchronous: a write returns only after every effect it
//! triggered, and everything those effects triggered in turn, has finished.

mod config;
mod context;
mod effect;
mod list;
mod object;
mod subscriber;

pub use config::{ContextConfig, TrackingMode};
pub use context::ReactivityContext;
pub use effect::EffectHandle;
pub use list::ReactiveList;
pub use object::ReactiveObject;
pub use subscriber::{Subscription, SubscriptionId};
