//! Identity-keyed memo of visited nodes
//!
//! Maps a source reference node to the node produced for it during one
//! traversal. Lookups go by identity, never by structure.

use std::collections::HashMap;

use nodegraft_node::{Node, NodeId};

#[derive(Debug)]
struct Entry {
    // Keeps the source allocation alive so its address cannot be reused
    // by a node allocated later in the same traversal.
    _source: Node,
    produced: Node,
}

/// Source-identity to produced-node table for a single traversal
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    entries: HashMap<NodeId, Entry>,
}

impl IdentityRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty registry with room for `capacity` entries
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Node produced for `source`, if already recorded
    ///
    /// Always `None` for scalars.
    #[must_use]
    pub fn lookup(&self, source: &Node) -> Option<Node> {
        let id = source.id()?;
        self.entries.get(&id).map(|entry| entry.produced.clone())
    }

    /// Record what `source` produced
    ///
    /// Scalars are ignored. Recording an identity twice keeps the last value.
    pub fn record(&mut self, source: &Node, produced: Node) {
        if let Some(id) = source.id() {
            self.entries.insert(
                id,
                Entry {
                    _source: source.clone(),
                    produced,
                },
            );
        }
    }

    /// Number of recorded identities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
