//! Keyed map nodes
//!
//! A [`Map`] is a shared handle: cloning it aliases the same underlying
//! properties, so identity is preserved wherever the handle travels.
//! Each map may delegate reads to a prototype map (see [`Map::overlay`]).

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::node::{Node, NodeId};

/// Shared, insertion-ordered keyed map node
///
/// Own properties keep insertion order. Reads through [`Map::get`] fall back
/// to the prototype chain; writes always land on the map itself.
#[derive(Clone, Default)]
pub struct Map(Arc<MapCell>);

#[derive(Default)]
struct MapCell {
    props: RwLock<IndexMap<String, Node>>,
    proto: Option<Map>,
}

impl Map {
    /// Create empty map with no prototype
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create map from key/value pairs
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        let props = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Arc::new(MapCell {
            props: RwLock::new(props),
            proto: None,
        }))
    }

    /// Create an empty overlay that delegates reads to `self`
    ///
    /// None of `self`'s properties are copied. Until the overlay is given
    /// its own value for a key, [`Map::get`] observes the live value on
    /// `self` (and further up its chain).
    #[must_use]
    pub fn overlay(&self) -> Self {
        Self(Arc::new(MapCell {
            props: RwLock::new(IndexMap::new()),
            proto: Some(self.clone()),
        }))
    }

    /// Identity of this map
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Whether both handles point at the same map
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Prototype this map delegates to, if any
    #[inline]
    #[must_use]
    pub fn prototype(&self) -> Option<&Map> {
        self.0.proto.as_ref()
    }

    /// Read a property, falling back to the prototype chain
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Node> {
        let mut current = Some(self);
        while let Some(map) = current {
            if let Some(value) = map.get_own(key) {
                return Some(value);
            }
            current = map.prototype();
        }
        None
    }

    /// Read an own property only
    #[must_use]
    pub fn get_own(&self, key: &str) -> Option<Node> {
        self.0.props.read().get(key).cloned()
    }

    /// Whether the key is visible on this map or its prototype chain
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether the key is an own property
    #[must_use]
    pub fn has_own(&self, key: &str) -> bool {
        self.0.props.read().contains_key(key)
    }

    /// Set an own property, returning the previous own value
    #[allow(clippy::must_use_candidate)]
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.0.props.write().insert(key.into(), value.into())
    }

    /// Remove an own property, keeping the order of the others
    pub fn remove(&self, key: &str) -> Option<Node> {
        self.0.props.write().shift_remove(key)
    }

    /// Remove all own properties
    pub fn clear(&self) {
        self.0.props.write().clear();
    }

    /// Own keys in insertion order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.props.read().keys().cloned().collect()
    }

    /// Own keys followed by inherited keys not already seen
    ///
    /// Nearest prototype first; each key appears once.
    #[must_use]
    pub fn enumerable_keys(&self) -> Vec<String> {
        let mut seen = IndexSet::new();
        let mut current = Some(self);
        while let Some(map) = current {
            // IndexSet::insert keeps the first position of a repeated key
            for key in map.0.props.read().keys() {
                seen.insert(key.clone());
            }
            current = map.prototype();
        }
        seen.into_iter().collect()
    }

    /// Snapshot of own properties in insertion order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Node)> {
        self.0
            .props
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of own properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.props.read().len()
    }

    /// Whether the map has no own properties
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.props.read().is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}
