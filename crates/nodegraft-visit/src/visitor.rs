//! Traversal entry points

use nodegraft_node::Node;

use crate::config::VisitConfig;
use crate::direct::{DirectWalk, Transform};
use crate::suspend::{SuspendingTransform, SuspendingWalk};

/// Graph visitor
///
/// Owns only configuration. Every call builds a private identity registry
/// and drops it on return, so one visitor can serve any number of
/// traversals, including concurrent ones over disjoint graphs.
#[derive(Debug, Clone, Default)]
pub struct GraphVisitor {
    config: VisitConfig,
}

impl GraphVisitor {
    /// Create visitor with configuration
    #[inline]
    #[must_use]
    pub fn new(config: VisitConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &VisitConfig {
        &self.config
    }

    /// Transform `root` in direct mode
    ///
    /// # Errors
    /// Returns the first error raised by the transform or a post-visit hook
    pub fn visit<E>(&self, root: &Node, transform: &Transform<E>) -> Result<Node, E> {
        tracing::debug!(root = %root.kind(), "visit started");
        let mut walk = DirectWalk::new(&self.config);
        let out = walk.node(root, transform);
        tracing::debug!(
            registered = walk.registry().len(),
            ok = out.is_ok(),
            "visit finished"
        );
        out
    }

    /// Transform `root`, letting the transform suspend at every node
    ///
    /// # Errors
    /// Returns the first error raised by the transform or a post-visit hook
    pub async fn visit_suspending<E>(
        &self,
        root: &Node,
        transform: &SuspendingTransform<E>,
    ) -> Result<Node, E>
    where
        E: Send + 'static,
    {
        tracing::debug!(root = %root.kind(), "suspending visit started");
        let mut walk = SuspendingWalk::new(&self.config);
        let out = walk.node(root.clone(), transform.clone()).await;
        tracing::debug!(
            registered = walk.registry().len(),
            ok = out.is_ok(),
            "suspending visit finished"
        );
        out
    }
}
