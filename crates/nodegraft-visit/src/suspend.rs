//! Suspension-capable traversal
//!
//! The transform returns a future, so a node's transformation may await
//! other work (a remote lookup, a timer, another task) before it answers.
//! Each recursive step is its own boxed future and is awaited before the
//! next one starts, so nodes are visited in exactly the order of the
//! direct mode. The key filter, key mapper and post-visit directives have
//! `_async` variants that are awaited at the same points where their
//! synchronous forms run. There is no cancellation: dropping the future abandons the
//! traversal together with its registry.

use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use nodegraft_node::{Node, Seq};

use crate::config::VisitConfig;
use crate::direct::Transform;
use crate::directive::{Finished, VisitResult};
use crate::registry::IdentityRegistry;

/// Directives returned by a [`SuspendingTransform`]
pub type SuspendingResult<E> = VisitResult<SuspendingTransform<E>, E>;

type SuspendingOutput<E> = Result<Option<SuspendingResult<E>>, E>;

type SuspendingFn<E> = dyn Fn(Node) -> BoxFuture<'static, SuspendingOutput<E>> + Send + Sync;

/// Per-node transformation that may suspend before answering
pub struct SuspendingTransform<E>(Arc<SuspendingFn<E>>);

impl<E: Send + 'static> SuspendingTransform<E> {
    /// Wrap an async transformation
    ///
    /// ```rust
    /// use nodegraft_node::Node;
    /// use nodegraft_visit::{SuspendingResult, SuspendingTransform};
    ///
    /// let upper = SuspendingTransform::<std::convert::Infallible>::new(|node: Node| async move {
    ///     Ok(node
    ///         .as_str()
    ///         .map(|s| SuspendingResult::new().with_value(s.to_uppercase())))
    /// });
    /// # let _ = upper;
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Node) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SuspendingOutput<E>> + Send + 'static,
    {
        Self(Arc::new(move |node| f(node).boxed()))
    }

    /// Transform that copies every node unchanged
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|_| future::ready(Ok(None)))
    }

    /// Lift a direct transform; it answers without ever suspending
    ///
    /// Child visitor overrides it returns are lifted the same way.
    #[must_use]
    pub fn from_direct(transform: Transform<E>) -> Self {
        Self::new(move |node| {
            let answer = transform
                .call(&node)
                .map(|result| result.map(|r| r.map_child_visitor(Self::from_direct)));
            future::ready(answer)
        })
    }

    /// Start the transformation of one node
    #[inline]
    #[must_use]
    pub fn call(&self, node: Node) -> BoxFuture<'static, SuspendingOutput<E>> {
        (self.0)(node)
    }
}

impl<E> Clone for SuspendingTransform<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Debug for SuspendingTransform<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SuspendingTransform(..)")
    }
}

impl<E: Send + 'static> SuspendingResult<E> {
    /// Like [`VisitResult::with_child_keys_filter`], but the filter may suspend
    #[must_use]
    pub fn with_child_keys_filter_async<F, Fut>(self, filter: F) -> Self
    where
        F: Fn(String, Node) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.with_async_child_keys_filter(Box::new(move |key, source| filter(key, source).boxed()))
    }

    /// Like [`VisitResult::with_key_mapper`], but the mapper may suspend
    #[must_use]
    pub fn with_key_mapper_async<F, Fut>(self, mapper: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<String>> + Send + 'static,
    {
        self.with_async_key_mapper(Box::new(move |key| mapper(key).boxed()))
    }

    /// Like [`VisitResult::with_post_visit`], but the rewrite may suspend
    ///
    /// ```rust
    /// use nodegraft_node::Node;
    /// use nodegraft_visit::SuspendingResult;
    ///
    /// let result = SuspendingResult::<std::convert::Infallible>::new()
    ///     .with_post_visit_async(|rebuilt: Node| async move {
    ///         if let Some(map) = rebuilt.as_map() {
    ///             map.insert("built", true);
    ///         }
    ///         Ok(rebuilt)
    ///     });
    /// # let _ = result;
    /// ```
    #[must_use]
    pub fn with_post_visit_async<F, Fut>(self, post_visit: F) -> Self
    where
        F: Fn(Node) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, E>> + Send + 'static,
    {
        self.with_async_post_visit(Box::new(move |rebuilt| post_visit(rebuilt).boxed()))
    }
}

impl<E: Send + 'static> From<Transform<E>> for SuspendingTransform<E> {
    fn from(transform: Transform<E>) -> Self {
        Self::from_direct(transform)
    }
}

/// State of one suspending traversal
pub(crate) struct SuspendingWalk<'c> {
    registry: IdentityRegistry,
    config: &'c VisitConfig,
}

impl<'c> SuspendingWalk<'c> {
    pub(crate) fn new(config: &'c VisitConfig) -> Self {
        Self {
            registry: IdentityRegistry::with_capacity(config.registry_capacity),
            config,
        }
    }

    pub(crate) fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub(crate) fn node<E>(
        &mut self,
        node: Node,
        transform: SuspendingTransform<E>,
    ) -> BoxFuture<'_, Result<Node, E>>
    where
        E: Send + 'static,
    {
        // Boxed so the recursion has a finite future type
        self.step(node, transform).boxed()
    }

    async fn step<E>(&mut self, node: Node, transform: SuspendingTransform<E>) -> Result<Node, E>
    where
        E: Send + 'static,
    {
        if let Some(done) = self.registry.lookup(&node) {
            tracing::trace!(kind = %node.kind(), "already visited, reusing output");
            return Ok(done);
        }
        tracing::trace!(kind = %node.kind(), "visiting node");

        if let Node::Seq(seq) = &node {
            let out = Seq::with_capacity(seq.len());
            self.registry.record(&node, Node::Seq(out.clone()));
            for item in seq.items() {
                out.push(self.node(item, transform.clone()).await?);
            }
            return Ok(Node::Seq(out));
        }

        let mut result = transform.call(node.clone()).await?.unwrap_or_default();
        let Node::Map(map) = &node else {
            return Ok(result.into_scalar(&node));
        };

        let out = result.take_output();
        self.registry.record(&node, out.clone());

        if let Some(target) = result.descent_target(&out) {
            let child_transform = result.child_visitor_or(&transform);
            for key in result.take_keys(map, self.config) {
                let Some(out_key) = result.target_key_suspending(&key, &node).await else {
                    continue;
                };
                let child = map.get(&key).unwrap_or_default();
                let produced = self.node(child, child_transform.clone()).await?;
                target.insert(out_key, produced);
            }
        }

        match result.finish_suspending(out).await? {
            Finished::Unchanged(out) => Ok(out),
            Finished::Rewritten(out) => {
                self.registry.record(&node, out.clone());
                Ok(out)
            }
        }
    }
}
