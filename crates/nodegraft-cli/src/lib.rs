//! nodegraft command line support
//!
//! Reads JSON documents, rewrites them through the graph visitor, and
//! renders the result. The `nodegraft` binary is a thin shell around these
//! functions.

#![warn(missing_docs)]

pub mod rules;

pub use rules::{RewriteRules, DEFAULT_REDACTION};

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use nodegraft_node::Node;
use serde_json::Value as JsonValue;

/// Read a JSON document from `input`, or from stdin when `None`
///
/// # Errors
/// Returns an error if the source cannot be read or is not valid JSON
pub fn read_document(input: Option<&Path>) -> anyhow::Result<JsonValue> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

/// Apply `rules` to every map of `document`
///
/// # Errors
/// Returns an error if the rewritten graph cannot be rendered as JSON
pub fn rewrite(document: JsonValue, rules: &RewriteRules) -> anyhow::Result<JsonValue> {
    if rules.is_empty() {
        tracing::debug!("empty ruleset, document passes through");
    }
    let source = Node::from(document);
    let out = nodegraft_visit::visit(&source, &rules.to_transform())
        .unwrap_or_else(|never| match never {});
    out.to_json().context("rewritten document is not a tree")
}

/// Render `value` as JSON text
///
/// # Errors
/// Returns an error if serialization fails
pub fn render(value: &JsonValue, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("failed to render JSON")
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
