//! Per-node visit directives
//!
//! A transform answers each node with an optional [`VisitResult`]. Every
//! field is optional and falls back to "copy this node, descend into all of
//! its properties with the same transform".

use std::fmt::{self, Debug, Formatter};

use futures::future::BoxFuture;
use nodegraft_node::{Map, Node};

use crate::config::VisitConfig;

/// Decides whether property `key` of the source node is visited
pub type KeyFilter = Box<dyn Fn(&str, &Node) -> bool + Send + Sync>;

/// Renames a property; `None` or an empty name drops it from the output
pub type KeyMapper = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Final rewrite of a map node once all of its properties are visited
pub type PostVisit<E> = Box<dyn Fn(Node) -> Result<Node, E> + Send + Sync>;

/// Suspending [`KeyFilter`]; receives owned copies of the key and source
pub type AsyncKeyFilter = Box<dyn Fn(String, Node) -> BoxFuture<'static, bool> + Send + Sync>;

/// Suspending [`KeyMapper`]
pub type AsyncKeyMapper = Box<dyn Fn(String) -> BoxFuture<'static, Option<String>> + Send + Sync>;

/// Suspending [`PostVisit`]
pub type AsyncPostVisit<E> =
    Box<dyn Fn(Node) -> BoxFuture<'static, Result<Node, E>> + Send + Sync>;

/// Callbacks only the suspending walk can await
///
/// Each one replaces its synchronous counterpart on the same result.
struct AsyncHooks<E> {
    child_keys_filter: Option<AsyncKeyFilter>,
    key_mapper: Option<AsyncKeyMapper>,
    post_visit: Option<AsyncPostVisit<E>>,
}

impl<E> Default for AsyncHooks<E> {
    fn default() -> Self {
        Self {
            child_keys_filter: None,
            key_mapper: None,
            post_visit: None,
        }
    }
}

/// What a transform returns for one node
///
/// # Type Parameters
/// - `C`: child visitor handle of the traversal mode
///   ([`crate::Transform`] or [`crate::SuspendingTransform`])
/// - `E`: caller's error type
pub struct VisitResult<C, E> {
    value: Option<Node>,
    stop: bool,
    child_keys_filter: Option<KeyFilter>,
    key_mapper: Option<KeyMapper>,
    property_allow_list: Option<Vec<String>>,
    post_visit: Option<PostVisit<E>>,
    child_visitor: Option<C>,
    hooks: AsyncHooks<E>,
}

impl<C, E> VisitResult<C, E> {
    /// Result with every directive at its default
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node with `value` and do not descend into it
    #[inline]
    #[must_use]
    pub fn replace(value: impl Into<Node>) -> Self {
        Self::new().with_value(value).with_stop(true)
    }

    /// Replacement for this node
    ///
    /// For maps, visited properties are assigned onto this value.
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Node>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Stop descending into this node's properties
    #[inline]
    #[must_use]
    pub fn with_stop(mut self, stop: bool) -> Self {
        self.stop = stop;
        self
    }

    /// Visit only the properties accepted by `filter(key, source)`
    #[inline]
    #[must_use]
    pub fn with_child_keys_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &Node) -> bool + Send + Sync + 'static,
    {
        self.child_keys_filter = Some(Box::new(filter));
        self.hooks.child_keys_filter = None;
        self
    }

    /// Rename properties in the output
    #[inline]
    #[must_use]
    pub fn with_key_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.key_mapper = Some(Box::new(mapper));
        self.hooks.key_mapper = None;
        self
    }

    /// Visit exactly these keys, in this order, instead of enumerating
    #[inline]
    #[must_use]
    pub fn with_property_allow_list<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.property_allow_list = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Rewrite the rebuilt node after its properties are visited
    #[inline]
    #[must_use]
    pub fn with_post_visit<F>(mut self, post_visit: F) -> Self
    where
        F: Fn(Node) -> Result<Node, E> + Send + Sync + 'static,
    {
        self.post_visit = Some(Box::new(post_visit));
        self.hooks.post_visit = None;
        self
    }

    /// Transform used for this node's children instead of the current one
    #[inline]
    #[must_use]
    pub fn with_child_visitor(mut self, visitor: C) -> Self {
        self.child_visitor = Some(visitor);
        self
    }

    /// Replacement value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&Node> {
        self.value.as_ref()
    }

    /// Whether descent stops at this node
    #[inline]
    #[must_use]
    pub fn stops(&self) -> bool {
        self.stop
    }

    /// Explicit key list, if any
    #[inline]
    #[must_use]
    pub fn property_allow_list(&self) -> Option<&[String]> {
        self.property_allow_list.as_deref()
    }

    /// Convert the child visitor handle, keeping every other directive
    #[must_use]
    pub fn map_child_visitor<D, F>(self, f: F) -> VisitResult<D, E>
    where
        F: FnOnce(C) -> D,
    {
        VisitResult {
            value: self.value,
            stop: self.stop,
            child_keys_filter: self.child_keys_filter,
            key_mapper: self.key_mapper,
            property_allow_list: self.property_allow_list,
            post_visit: self.post_visit,
            child_visitor: self.child_visitor.map(f),
            hooks: self.hooks,
        }
    }

    pub(crate) fn with_async_child_keys_filter(mut self, filter: AsyncKeyFilter) -> Self {
        self.hooks.child_keys_filter = Some(filter);
        self.child_keys_filter = None;
        self
    }

    pub(crate) fn with_async_key_mapper(mut self, mapper: AsyncKeyMapper) -> Self {
        self.hooks.key_mapper = Some(mapper);
        self.key_mapper = None;
        self
    }

    pub(crate) fn with_async_post_visit(mut self, post_visit: AsyncPostVisit<E>) -> Self {
        self.hooks.post_visit = Some(post_visit);
        self.post_visit = None;
        self
    }

    /// Scalar output: the replacement, or the scalar itself
    pub(crate) fn into_scalar(self, source: &Node) -> Node {
        self.value.unwrap_or_else(|| source.clone())
    }

    /// Map output container: the replacement, or a fresh empty map
    pub(crate) fn take_output(&mut self) -> Node {
        self.value.take().unwrap_or_else(Node::map)
    }

    /// Map to assign visited properties onto, if descent goes ahead
    pub(crate) fn descent_target(&self, out: &Node) -> Option<Map> {
        if self.stop {
            return None;
        }
        let target = out.as_map().cloned();
        if target.is_none() {
            tracing::trace!(kind = %out.kind(), "replacement is not a map, skipping descent");
        }
        target
    }

    /// Keys to consider, in visiting order
    pub(crate) fn take_keys(&mut self, source: &Map, config: &VisitConfig) -> Vec<String> {
        self.property_allow_list
            .take()
            .unwrap_or_else(|| config.keys_of(source))
    }

    fn accepts(&self, key: &str, source: &Node) -> bool {
        match &self.child_keys_filter {
            Some(filter) => filter(key, source),
            None => true,
        }
    }

    fn rename(&self, key: &str) -> Option<String> {
        match &self.key_mapper {
            Some(mapper) => mapper(key),
            None => Some(key.to_string()),
        }
    }

    /// Output key for `key`, or `None` if the property is skipped or dropped
    pub(crate) fn target_key(&self, key: &str, source: &Node) -> Option<String> {
        if !self.accepts(key, source) {
            return None;
        }
        self.rename(key).filter(|mapped| !mapped.is_empty())
    }

    /// [`Self::target_key`], awaiting suspending filter and mapper
    pub(crate) async fn target_key_suspending(&self, key: &str, source: &Node) -> Option<String> {
        let accepted = match &self.hooks.child_keys_filter {
            Some(filter) => filter(key.to_string(), source.clone()).await,
            None => self.accepts(key, source),
        };
        if !accepted {
            return None;
        }
        let mapped = match &self.hooks.key_mapper {
            Some(mapper) => mapper(key.to_string()).await,
            None => self.rename(key),
        };
        mapped.filter(|mapped| !mapped.is_empty())
    }

    /// Visitor for children: the override, or `current`
    pub(crate) fn child_visitor_or(&self, current: &C) -> C
    where
        C: Clone,
    {
        self.child_visitor.as_ref().unwrap_or(current).clone()
    }

    /// Apply the post-visit rewrite, if one was given
    pub(crate) fn finish(&self, out: Node) -> Result<Finished, E> {
        match &self.post_visit {
            Some(post_visit) => post_visit(out).map(Finished::Rewritten),
            None => Ok(Finished::Unchanged(out)),
        }
    }

    /// [`Self::finish`], awaiting a suspending post-visit rewrite
    pub(crate) async fn finish_suspending(&self, out: Node) -> Result<Finished, E> {
        match &self.hooks.post_visit {
            Some(post_visit) => post_visit(out).await.map(Finished::Rewritten),
            None => self.finish(out),
        }
    }
}

/// Outcome of [`VisitResult::finish`]
pub(crate) enum Finished {
    Unchanged(Node),
    Rewritten(Node),
}

impl<C, E> Default for VisitResult<C, E> {
    fn default() -> Self {
        Self {
            value: None,
            stop: false,
            child_keys_filter: None,
            key_mapper: None,
            property_allow_list: None,
            post_visit: None,
            child_visitor: None,
            hooks: AsyncHooks::default(),
        }
    }
}

impl<C, E> Debug for VisitResult<C, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitResult")
            .field("value", &self.value)
            .field("stop", &self.stop)
            .field(
                "child_keys_filter",
                &(self.child_keys_filter.is_some() || self.hooks.child_keys_filter.is_some()),
            )
            .field(
                "key_mapper",
                &(self.key_mapper.is_some() || self.hooks.key_mapper.is_some()),
            )
            .field("property_allow_list", &self.property_allow_list)
            .field(
                "post_visit",
                &(self.post_visit.is_some() || self.hooks.post_visit.is_some()),
            )
            .field("child_visitor", &self.child_visitor.is_some())
            .finish()
    }
}
