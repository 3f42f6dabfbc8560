//! SignalRegistry: pure lookups consumed by phase 3's routing and by
//! scorers. A missing key is a hard failure; there is no fallback.

use std::collections::HashMap;

use crate::core::errors::{PipelineError, Result};

/// An opaque signal value a `SignalRegistry` resolves for a key. Its
/// interpretation belongs to whatever scorer consumes it; the registry
/// itself is a pure lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// The raw payload associated with this signal's key.
    pub value: f64,
}

/// A registry of named signals. Lookups are pure: no I/O, no mutation,
/// deterministic across calls.
pub trait SignalRegistry: Send + Sync {
    /// Resolves `key`, or a [`PipelineError::Internal`] if it is absent.
    fn lookup(&self, key: &str) -> Result<Signal>;
}

/// A registry backed by a fixed `HashMap`, built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct InMemorySignalRegistry {
    signals: HashMap<String, Signal>,
}

impl InMemorySignalRegistry {
    /// Builds a registry from key/value pairs.
    pub fn new(signals: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            signals: signals
                .into_iter()
                .map(|(k, v)| (k, Signal { value: v }))
                .collect(),
        }
    }
}

impl SignalRegistry for InMemorySignalRegistry {
    fn lookup(&self, key: &str) -> Result<Signal> {
        self.signals
            .get(key)
            .cloned()
            .ok_or_else(|| PipelineError::internal(format!("no signal registered for key {key}")))
    }
}
