//! Error types for node operations

use crate::node::NodeKind;

/// Errors raised by node conversions and accessors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// A reference node was reached again while still being converted
    #[error("cycle detected at {path}")]
    Cycle {
        /// JSON pointer of the back-edge
        path: String,
    },

    /// Expected a map
    #[error("expected a map, found {0}")]
    NotAMap(NodeKind),

    /// Expected a sequence
    #[error("expected a sequence, found {0}")]
    NotASeq(NodeKind),
}
