//! nodegraft graph visitor
//!
//! Produces a transformed copy of an object graph, calling a caller-supplied
//! transform at every node. Shared and cyclic references are preserved: a
//! node reachable along several paths is transformed once, and every path
//! leads to the same output node.
//!
//! # Overview
//!
//! - [`Transform`] / [`visit`]: direct mode, runs to completion
//! - [`SuspendingTransform`] / [`visit_suspending`]: the transform returns a
//!   future and may await before answering; same visiting order
//! - [`VisitResult`]: per-node directives (replacement, stop, key filter,
//!   key renaming, allow-list, post-visit rewrite, child visitor override);
//!   in suspending mode the filter, renaming and post-visit callbacks may
//!   themselves suspend
//! - [`IdentityRegistry`]: identity-keyed memo behind cycle handling
//!
//! # Example
//!
//! ```rust
//! use nodegraft_node::{Map, Node};
//! use nodegraft_visit::{visit, DirectResult, Transform};
//!
//! let root = Map::new();
//! root.insert("a", 1);
//! root.insert("b", 2);
//! root.insert("me", root.clone());
//!
//! let upper = Transform::<std::convert::Infallible>::new(|node| {
//!     Ok(node.as_map().map(|_| {
//!         DirectResult::new()
//!             .with_child_keys_filter(|key, _| key != "b")
//!             .with_key_mapper(|key| Some(key.to_uppercase()))
//!     }))
//! });
//!
//! let out = visit(&Node::Map(root), &upper).unwrap();
//! assert_eq!(out.get("A"), Some(Node::from(1)));
//! assert!(out.get("B").is_none());
//! assert!(out.get("ME").unwrap().same(&out));
//! ```

#![warn(missing_docs)]

mod config;
mod direct;
mod directive;
mod registry;
mod suspend;
mod visitor;

// Re-exports
pub use config::VisitConfig;
pub use direct::{visit_copy, DirectResult, Transform};
pub use directive::{
    AsyncKeyFilter, AsyncKeyMapper, AsyncPostVisit, KeyFilter, KeyMapper, PostVisit, VisitResult,
};
pub use registry::IdentityRegistry;
pub use suspend::{SuspendingResult, SuspendingTransform};
pub use visitor::GraphVisitor;

use nodegraft_node::Node;

/// Transform `root` in direct mode with default configuration
///
/// # Errors
/// Returns the first error raised by the transform or a post-visit hook
pub fn visit<E>(root: &Node, transform: &Transform<E>) -> Result<Node, E> {
    GraphVisitor::default().visit(root, transform)
}

/// Transform `root` in suspension-capable mode with default configuration
///
/// # Errors
/// Returns the first error raised by the transform or a post-visit hook
pub async fn visit_suspending<E>(root: &Node, transform: &SuspendingTransform<E>) -> Result<Node, E>
where
    E: Send + 'static,
{
    GraphVisitor::default().visit_suspending(root, transform).await
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        visit, visit_copy, visit_suspending, DirectResult, GraphVisitor, SuspendingResult,
        SuspendingTransform, Transform, VisitConfig, VisitResult,
    };
    pub use nodegraft_node::{Map, Node, Seq};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
