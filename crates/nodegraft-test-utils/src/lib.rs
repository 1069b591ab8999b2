//! Testing utilities for nodegraft workspace
//!
//! Shared graph fixtures and a spying transform.

#![allow(missing_docs)]

use std::sync::Arc;

use nodegraft_node::{Map, Node, Seq};
use nodegraft_visit::{DirectResult, SuspendingTransform, Transform};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

pub fn json(value: JsonValue) -> Node {
    Node::from(value)
}

/// `x = {name: "loop"}; x.self = x`
pub fn self_referential_map() -> Node {
    let map = Map::new();
    map.insert("name", "loop");
    map.insert("self", map.clone());
    Node::Map(map)
}

/// `s = [1]; s.push(s)`
pub fn self_referential_seq() -> Node {
    let seq = Seq::new();
    seq.push(1);
    seq.push(seq.clone());
    Node::Seq(seq)
}

/// `{a: shared, b: shared, list: [shared]}`; returns `(root, shared)`
pub fn diamond() -> (Node, Node) {
    let shared = json(serde_json::json!({"leaf": true}));
    let root = Map::new();
    root.insert("a", shared.clone());
    root.insert("b", shared.clone());
    root.insert("list", vec![shared.clone()]);
    (Node::Map(root), shared)
}

/// Two maps pointing at each other: `a.peer = b; b.peer = a`
pub fn mutual_pair() -> Node {
    let a = Map::new();
    let b = Map::new();
    a.insert("id", "a");
    b.insert("id", "b");
    a.insert("peer", b.clone());
    b.insert("peer", a.clone());
    Node::Map(a)
}

/// Records every node a transform is invoked on
#[derive(Debug, Clone, Default)]
pub struct Spy {
    calls: Arc<Mutex<Vec<Node>>>,
}

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity transform that records its inputs
    pub fn transform<E: 'static>(&self) -> Transform<E> {
        let calls = Arc::clone(&self.calls);
        Transform::new(move |node| {
            calls.lock().push(node.clone());
            Ok(None)
        })
    }

    /// Identity transform that records and defers to `inner`
    pub fn wrap<E: 'static>(&self, inner: Transform<E>) -> Transform<E> {
        let calls = Arc::clone(&self.calls);
        Transform::new(move |node| -> Result<Option<DirectResult<E>>, E> {
            calls.lock().push(node.clone());
            inner.call(node)
        })
    }

    /// Suspending identity transform that records its inputs
    pub fn suspending<E: Send + 'static>(&self) -> SuspendingTransform<E> {
        let calls = Arc::clone(&self.calls);
        SuspendingTransform::new(move |node| {
            calls.lock().push(node);
            std::future::ready(Ok(None))
        })
    }

    /// Record a call made outside the spy's own transforms
    pub fn record(&self, node: &Node) {
        self.calls.lock().push(node.clone());
    }

    pub fn calls(&self) -> Vec<Node> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Whether the transform ran on this exact node (by identity)
    pub fn was_called_on(&self, node: &Node) -> bool {
        self.calls.lock().iter().any(|seen| seen.same(node))
    }

    /// How many times the transform ran on this exact node
    pub fn times_called_on(&self, node: &Node) -> usize {
        self.calls.lock().iter().filter(|seen| seen.same(node)).count()
    }
}
