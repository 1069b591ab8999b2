//! Traversal configuration

use nodegraft_node::Map;
use serde::{Deserialize, Serialize};

/// Visitor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitConfig {
    /// Enumerate inherited (prototype) keys as well as own keys
    pub inherited_keys: bool,
    /// Initial capacity of the identity registry
    pub registry_capacity: usize,
}

impl VisitConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With inherited key enumeration
    #[inline]
    #[must_use]
    pub fn with_inherited_keys(mut self, inherited: bool) -> Self {
        self.inherited_keys = inherited;
        self
    }

    /// With registry capacity hint
    #[inline]
    #[must_use]
    pub fn with_registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }

    /// Keys of `map` visited when no allow-list is given
    pub(crate) fn keys_of(&self, map: &Map) -> Vec<String> {
        if self.inherited_keys {
            map.enumerable_keys()
        } else {
            map.keys()
        }
    }
}
