//! nodegraft node model
//!
//! Object graphs built from keyed maps, ordered sequences and scalar leaves.
//!
//! # Core Concepts
//!
//! - [`Node`]: any value in a graph
//! - [`Map`] / [`Seq`]: shared reference nodes; cloning a handle aliases the node
//! - [`NodeId`]: identity of a reference node, used for memoized traversal
//! - [`copy::clone`]: delegating overlay of a map
//! - [`copy::deep_clone`]: independent deep copy of a tree
//!
//! # Example
//!
//! ```rust
//! use nodegraft_node::{Map, Node};
//!
//! let root = Map::new();
//! root.insert("name", "graph");
//! root.insert("self", root.clone());
//!
//! let node = Node::Map(root);
//! assert!(node.get("self").unwrap().same(&node));
//! assert_eq!(node.to_string(), r#"{"name": "graph", "self": <cycle>}"#);
//! ```

#![warn(missing_docs)]

mod error;
mod json;
mod map;
mod node;
mod seq;

pub mod copy;
pub mod hash;
pub mod merge;
pub mod types;

// Re-exports
pub use error::NodeError;
pub use map::Map;
pub use node::{Node, NodeId, NodeKind};
pub use seq::Seq;

pub use copy::{clone, deep_clone};
pub use hash::hash_code;
pub use merge::extend;
pub use types::{is_custom_type, is_primitive_type};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
