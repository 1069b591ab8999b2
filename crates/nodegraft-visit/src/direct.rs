//! Direct (non-suspending) traversal
//!
//! The transform is an ordinary function and the whole traversal runs to
//! completion on the calling thread.

use std::convert::Infallible;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use nodegraft_node::{Map, Node, Seq};

use crate::config::VisitConfig;
use crate::directive::{Finished, VisitResult};
use crate::registry::IdentityRegistry;

/// Directives returned by a direct-mode [`Transform`]
pub type DirectResult<E> = VisitResult<Transform<E>, E>;

type DirectFn<E> = dyn Fn(&Node) -> Result<Option<DirectResult<E>>, E> + Send + Sync;

/// Per-node transformation for direct mode
///
/// A cheap, cloneable handle. Returning `Ok(None)` copies the node through;
/// returning an error aborts the traversal with that error.
pub struct Transform<E>(Arc<DirectFn<E>>);

impl<E> Transform<E> {
    /// Wrap a transformation function
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node) -> Result<Option<DirectResult<E>>, E> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Transform that copies every node unchanged
    #[inline]
    #[must_use]
    pub fn identity() -> Self
    where
        E: 'static,
    {
        Self::new(|_| Ok(None))
    }

    /// Run the transformation on one node
    ///
    /// # Errors
    /// Propagates the transformation's own error
    #[inline]
    pub fn call(&self, node: &Node) -> Result<Option<DirectResult<E>>, E> {
        (self.0)(node)
    }
}

impl<E> Clone for Transform<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Debug for Transform<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// State of one direct traversal
pub(crate) struct DirectWalk<'c> {
    registry: IdentityRegistry,
    config: &'c VisitConfig,
}

impl<'c> DirectWalk<'c> {
    pub(crate) fn new(config: &'c VisitConfig) -> Self {
        Self {
            registry: IdentityRegistry::with_capacity(config.registry_capacity),
            config,
        }
    }

    pub(crate) fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub(crate) fn node<E>(&mut self, node: &Node, transform: &Transform<E>) -> Result<Node, E> {
        if let Some(done) = self.registry.lookup(node) {
            tracing::trace!(kind = %node.kind(), "already visited, reusing output");
            return Ok(done);
        }
        tracing::trace!(kind = %node.kind(), "visiting node");

        match node {
            Node::Seq(seq) => self.seq(node, seq, transform),
            _ => {
                let result = transform.call(node)?.unwrap_or_default();
                match node {
                    Node::Map(map) => self.map(node, map, result, transform),
                    scalar => Ok(result.into_scalar(scalar)),
                }
            }
        }
    }

    fn seq<E>(&mut self, node: &Node, seq: &Seq, transform: &Transform<E>) -> Result<Node, E> {
        let out = Seq::with_capacity(seq.len());
        // Registered before the elements so a self-reference resolves to `out`
        self.registry.record(node, Node::Seq(out.clone()));
        for item in seq.items() {
            out.push(self.node(&item, transform)?);
        }
        Ok(Node::Seq(out))
    }

    fn map<E>(
        &mut self,
        node: &Node,
        map: &Map,
        mut result: DirectResult<E>,
        transform: &Transform<E>,
    ) -> Result<Node, E> {
        let out = result.take_output();
        self.registry.record(node, out.clone());

        if let Some(target) = result.descent_target(&out) {
            let child_transform = result.child_visitor_or(transform);
            for key in result.take_keys(map, self.config) {
                let Some(out_key) = result.target_key(&key, node) else {
                    continue;
                };
                let child = map.get(&key).unwrap_or_default();
                let produced = self.node(&child, &child_transform)?;
                target.insert(out_key, produced);
            }
        }

        match result.finish(out)? {
            Finished::Unchanged(out) => Ok(out),
            Finished::Rewritten(out) => {
                self.registry.record(node, out.clone());
                Ok(out)
            }
        }
    }
}

/// Copy a graph with the identity transform
///
/// Every reference node is reallocated; sharing and cycles are preserved.
#[must_use]
pub fn visit_copy(root: &Node) -> Node {
    crate::visit::<Infallible>(root, &Transform::identity()).unwrap_or_else(|never| match never {})
}
