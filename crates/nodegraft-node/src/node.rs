//! The node value type
//!
//! [`Node`] is any value of an object graph: a scalar leaf, an ordered
//! [`Seq`], or a keyed [`Map`]. Only sequences and maps carry identity;
//! scalars compare and copy by value.

use std::collections::HashSet;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use serde_json::Number;

use crate::error::NodeError;
use crate::map::Map;
use crate::seq::Seq;

/// Identity of a reference node
///
/// Derived from the address of the shared allocation, so it is stable for
/// as long as some handle keeps the node alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) fn of<T>(cell: &Arc<T>) -> Self {
        Self(Arc::as_ptr(cell).cast::<()>() as usize)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Coarse classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Absence marker
    Null,
    /// Boolean leaf
    Bool,
    /// Numeric leaf
    Number,
    /// String leaf
    String,
    /// Ordered sequence
    Seq,
    /// Keyed map
    Map,
}

impl NodeKind {
    /// Lower-case name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Seq => "array",
            Self::Map => "object",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in an object graph
#[derive(Clone, Default)]
pub enum Node {
    /// Absence marker
    #[default]
    Null,
    /// Boolean leaf
    Bool(bool),
    /// Numeric leaf
    Number(Number),
    /// String leaf
    String(String),
    /// Ordered sequence (reference node)
    Seq(Seq),
    /// Keyed map (reference node)
    Map(Map),
}

impl Node {
    /// New empty map node
    #[inline]
    #[must_use]
    pub fn map() -> Self {
        Self::Map(Map::new())
    }

    /// New empty sequence node
    #[inline]
    #[must_use]
    pub fn seq() -> Self {
        Self::Seq(Seq::new())
    }

    /// Kind of this node
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Bool(_) => NodeKind::Bool,
            Self::Number(_) => NodeKind::Number,
            Self::String(_) => NodeKind::String,
            Self::Seq(_) => NodeKind::Seq,
            Self::Map(_) => NodeKind::Map,
        }
    }

    /// Identity of a reference node; `None` for scalars
    #[must_use]
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Self::Seq(seq) => Some(seq.id()),
            Self::Map(map) => Some(map.id()),
            _ => None,
        }
    }

    /// Whether this is a sequence or a map
    #[inline]
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Seq(_) | Self::Map(_))
    }

    /// Whether this is the absence marker
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Identity comparison
    ///
    /// Reference nodes are the same only if they are the same allocation;
    /// scalars are the same when their values are equal.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Seq(a), Self::Seq(b)) => a.ptr_eq(b),
            (Self::Map(a), Self::Map(b)) => a.ptr_eq(b),
            (Self::Seq(_) | Self::Map(_), _) | (_, Self::Seq(_) | Self::Map(_)) => false,
            _ => self == other,
        }
    }

    /// Borrow as map
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as sequence
    #[inline]
    #[must_use]
    pub const fn as_seq(&self) -> Option<&Seq> {
        match self {
            Self::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value, if representable as `i64`
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Floating-point value
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Map handle or [`NodeError::NotAMap`]
    ///
    /// # Errors
    /// Returns error if this node is not a map
    pub fn try_map(&self) -> Result<&Map, NodeError> {
        self.as_map().ok_or(NodeError::NotAMap(self.kind()))
    }

    /// Sequence handle or [`NodeError::NotASeq`]
    ///
    /// # Errors
    /// Returns error if this node is not a sequence
    pub fn try_seq(&self) -> Result<&Seq, NodeError> {
        self.as_seq().ok_or(NodeError::NotASeq(self.kind()))
    }

    /// Read a map property (through the prototype chain)
    ///
    /// `None` when the key is absent or this node is not a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Read a sequence element
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Node> {
        self.as_seq().and_then(|seq| seq.get(index))
    }
}

// Structural equality, cycle-safe: a pair of reference nodes already under
// comparison is assumed equal.
fn structural_eq(a: &Node, b: &Node, assumed: &mut HashSet<(NodeId, NodeId)>) -> bool {
    match (a, b) {
        (Node::Null, Node::Null) => true,
        (Node::Bool(x), Node::Bool(y)) => x == y,
        (Node::Number(x), Node::Number(y)) => x == y,
        (Node::String(x), Node::String(y)) => x == y,
        (Node::Seq(x), Node::Seq(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.id(), y.id())) {
                return true;
            }
            let (xs, ys) = (x.items(), y.items());
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(&ys)
                    .all(|(l, r)| structural_eq(l, r, assumed))
        }
        (Node::Map(x), Node::Map(y)) => {
            if x.ptr_eq(y) || !assumed.insert((x.id(), y.id())) {
                return true;
            }
            let entries = x.entries();
            entries.len() == y.len()
                && entries.iter().all(|(key, l)| {
                    y.get_own(key)
                        .is_some_and(|r| structural_eq(l, &r, assumed))
                })
        }
        _ => false,
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self, other, &mut HashSet::new())
    }
}

fn write_node(f: &mut Formatter<'_>, node: &Node, path: &mut Vec<NodeId>) -> fmt::Result {
    match node {
        Node::Null => f.write_str("null"),
        Node::Bool(b) => write!(f, "{b}"),
        Node::Number(n) => write!(f, "{n}"),
        Node::String(s) => write!(f, "{s:?}"),
        Node::Seq(seq) => {
            if path.contains(&seq.id()) {
                return f.write_str("<cycle>");
            }
            path.push(seq.id());
            f.write_str("[")?;
            for (i, item) in seq.items().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_node(f, item, path)?;
            }
            path.pop();
            f.write_str("]")
        }
        Node::Map(map) => {
            if path.contains(&map.id()) {
                return f.write_str("<cycle>");
            }
            path.push(map.id());
            f.write_str("{")?;
            for (i, (key, value)) in map.entries().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key:?}: ")?;
                write_node(f, value, path)?;
            }
            path.pop();
            f.write_str("}")
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_node(f, self, &mut Vec::new())
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_node(f, self, &mut Vec::new())
    }
}

impl Debug for Map {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_node(f, &Node::Map(self.clone()), &mut Vec::new())
    }
}

impl Debug for Seq {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_node(f, &Node::Seq(self.clone()), &mut Vec::new())
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Node {
    /// Non-finite values become [`Node::Null`]
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<Number> for Node {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Map> for Node {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Seq> for Node {
    fn from(value: Seq) -> Self {
        Self::Seq(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Self::Seq(Seq::from(value))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
