//! Signel Core
//!
//! This crate provides the dependency-tracking kernel behind Signel's reactive
//! DOM bindings. It implements:
//!
//! - Reactive objects with tracked reads and change-gated writes
//! - Effects that re-run automatically when a field they read changes
//! - Reactive lists that notify their subscribers on every mutation
//!
//! DOM querying, templating and event wiring live outside this crate. They
//! talk to the kernel only through "wrap this record", "run this function as
//! an effect" and "make this list".
//!
//! # Architecture
//!
//! - `reactive`: contexts, reactive objects, effects and lists
//! - `graph`: the `(object, field) -> effects` dependency store
//! - `error`: the crate's error type
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use signel_core::reactive::ReactivityContext;
//!
//! let ctx = ReactivityContext::new();
//! let counter = ctx.wrap([("count", 0)]);
//! let rendered = Arc::new(Mutex::new(String::new()));
//!
//! // Render whenever `count` changes.
//! let state = counter.clone();
//! let out = rendered.clone();
//! ctx.run(move || {
//!     *out.lock().unwrap() = format!("Count: {}", state.get("count"));
//! });
//!
//! counter.set("count", 5);
//! assert_eq!(*rendered.lock().unwrap(), "Count: 5");
//! ```

pub mod error;
pub mod graph;
pub mod reactive;

pub use error::{Error, Result};
pub use reactive::{
    ContextConfig, EffectHandle, ReactiveList, ReactiveObject, ReactivityContext, Subscription,
    TrackingMode,
};
