//! Dependency Graph
//!
//! This module holds the data structure behind automatic subscription: a
//! bipartite graph between `(object, field)` pairs and the effects that read
//! them.
//!
//! # Overview
//!
//! - An edge `(object, field) -> effect` is added the first time the effect
//!   reads that field while it is the active effect.
//! - A value-changing write looks up the pair and re-runs every effect on it.
//!
//! The graph has no behavior of its own. Deciding *when* to track or trigger
//! is the job of `reactive::ReactivityContext`.
//!
//! # Design Decisions
//!
//! 1. Objects and effects are addressed by counter-based IDs, so lookups are
//!    by identity, never by value.
//!
//! 2. Forward and reverse edges are both indexed, so "who reads this field"
//!    and "what does this effect read" are both direct lookups.

mod ids;
mod store;

pub use ids::{DepKey, EffectId, ObjectId};
pub use store::{DependencyStore, Dependents};
