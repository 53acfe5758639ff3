//! Context Configuration
//!
//! A [`ReactivityContext`](super::ReactivityContext) is configured once, at
//! construction. The configuration is plain data and can be loaded from JSON
//! by a host application.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an effect's dependencies evolve across re-runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Re-runs only ever add dependency edges.
    ///
    /// A field the effect read once keeps re-running it forever, even if a
    /// later run no longer reads it.
    #[default]
    Accumulate,

    /// Every run starts from an empty dependency set.
    ///
    /// The effect's edges are dropped before it runs and rebuilt from the
    /// reads of that run, so stale fields stop triggering it.
    Refresh,
}

/// Configuration for a reactivity context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Name recorded on every tracing event emitted by the context.
    pub name: String,

    /// Dependency tracking strategy for effect re-runs.
    pub tracking: TrackingMode,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: "default".to_owned(),
            tracking: TrackingMode::default(),
        }
    }
}

impl ContextConfig {
    /// Set the context name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the tracking mode.
    pub fn with_tracking(mut self, tracking: TrackingMode) -> Self {
        self.tracking = tracking;
        self
    }

    /// Parse a configuration from a JSON document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }
}
