//! Plain copies of nodes
//!
//! [`clone`] builds a delegating overlay over a single map; [`deep_clone`]
//! builds a fully independent copy of a tree. Neither tracks identity: use
//! a graph visitor when shared or cyclic nodes must be preserved.

use crate::map::Map;
use crate::node::Node;
use crate::seq::Seq;

/// Shallow overlay of `obj`
///
/// Returns a new empty map whose reads fall back to `obj` for any key the
/// copy does not define itself. Equivalent to [`Map::overlay`].
#[inline]
#[must_use]
pub fn clone(obj: &Map) -> Map {
    obj.overlay()
}

/// Deep copy of a node tree
///
/// Maps and sequences are reallocated all the way down; scalars are
/// returned as-is. Map copies flatten inherited properties into own ones
/// and carry no prototype. Shared sub-nodes become separate copies.
///
/// Cycles are not detected: a cyclic input recurses until the stack is
/// exhausted.
#[must_use]
pub fn deep_clone(obj: &Node) -> Node {
    match obj {
        Node::Map(map) => {
            let copy = Map::new();
            for key in map.enumerable_keys() {
                if let Some(value) = map.get(&key) {
                    copy.insert(key, deep_clone(&value));
                }
            }
            Node::Map(copy)
        }
        Node::Seq(seq) => Node::Seq(seq.items().iter().map(deep_clone).collect::<Seq>()),
        scalar => scalar.clone(),
    }
}
