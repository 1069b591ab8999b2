//! Bridge between [`Node`] graphs and `serde_json` trees
//!
//! JSON trees are acyclic by construction, so conversion into a graph always
//! succeeds. The reverse direction fails on cycles and duplicates shared
//! acyclic sub-nodes.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::NodeError;
use crate::map::Map;
use crate::node::{Node, NodeId};
use crate::seq::Seq;

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Seq(items.into_iter().map(Node::from).collect::<Seq>()),
            JsonValue::Object(props) => Self::Map(
                props
                    .into_iter()
                    .map(|(k, v)| (k, Node::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}

impl Node {
    /// Convert to a JSON tree
    ///
    /// Only own map properties are emitted.
    ///
    /// # Errors
    /// Returns [`NodeError::Cycle`] if a node is reachable from itself
    pub fn to_json(&self) -> Result<JsonValue, NodeError> {
        let mut stack = Vec::new();
        let mut pointer = String::new();
        to_json_inner(self, &mut stack, &mut pointer)
    }
}

fn to_json_inner(
    node: &Node,
    stack: &mut Vec<NodeId>,
    pointer: &mut String,
) -> Result<JsonValue, NodeError> {
    if let Some(id) = node.id() {
        if stack.contains(&id) {
            return Err(NodeError::Cycle {
                path: if pointer.is_empty() { "/".to_string() } else { pointer.clone() },
            });
        }
        stack.push(id);
    }

    let value = match node {
        Node::Null => JsonValue::Null,
        Node::Bool(b) => JsonValue::Bool(*b),
        Node::Number(n) => JsonValue::Number(n.clone()),
        Node::String(s) => JsonValue::String(s.clone()),
        Node::Seq(seq) => {
            let mut out = Vec::with_capacity(seq.len());
            for (index, item) in seq.items().iter().enumerate() {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                out.push(to_json_inner(item, stack, pointer)?);
                pointer.truncate(mark);
            }
            JsonValue::Array(out)
        }
        Node::Map(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map.entries() {
                let mark = pointer.len();
                pointer.push('/');
                // RFC 6901 escaping
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                out.insert(key, to_json_inner(&item, stack, pointer)?);
                pointer.truncate(mark);
            }
            JsonValue::Object(out)
        }
    };

    if node.is_reference() {
        stack.pop();
    }
    Ok(value)
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Node::from)
    }
}
