//! Ordered sequence nodes

use std::sync::Arc;

use parking_lot::RwLock;

use crate::node::{Node, NodeId};

/// Shared ordered sequence node
///
/// Like [`crate::Map`], cloning the handle aliases the same elements.
#[derive(Clone, Default)]
pub struct Seq(Arc<RwLock<Vec<Node>>>);

impl Seq {
    /// Create empty sequence
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty sequence with room for `capacity` elements
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Arc::new(RwLock::new(Vec::with_capacity(capacity))))
    }

    /// Identity of this sequence
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Whether both handles point at the same sequence
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Append an element
    pub fn push(&self, value: impl Into<Node>) {
        self.0.write().push(value.into());
    }

    /// Element at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Node> {
        self.0.read().get(index).cloned()
    }

    /// Replace the element at `index`, returning the old one
    ///
    /// Returns `None` and leaves the sequence untouched when out of bounds.
    pub fn set(&self, index: usize, value: impl Into<Node>) -> Option<Node> {
        let mut items = self.0.write();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, value.into()))
    }

    /// Snapshot of the elements in order
    #[must_use]
    pub fn items(&self) -> Vec<Node> {
        self.0.read().clone()
    }

    /// Remove all elements
    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the sequence is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl From<Vec<Node>> for Seq {
    fn from(items: Vec<Node>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }
}

impl FromIterator<Node> for Seq {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
