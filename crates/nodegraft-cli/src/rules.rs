//! Declarative rewrite rules
//!
//! A ruleset applies to every map of a document: properties are renamed or
//! dropped on the way down and redacted once the map is rebuilt.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use nodegraft_node::Node;
use nodegraft_visit::{DirectResult, Transform};
use serde::{Deserialize, Serialize};

/// Replacement text used when a rules file does not name one
pub const DEFAULT_REDACTION: &str = "[redacted]";

/// Rename, drop and redact rules
///
/// ```yaml
/// rename: { user_name: name }
/// drop: [internal_id]
/// redact: [password]
/// redaction: "***"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteRules {
    /// Source key to output key
    pub rename: BTreeMap<String, String>,
    /// Source keys removed from the output
    pub drop: Vec<String>,
    /// Output keys whose value is overwritten with `redaction`
    pub redact: Vec<String>,
    /// Replacement value for redacted keys
    pub redaction: String,
}

impl Default for RewriteRules {
    fn default() -> Self {
        Self {
            rename: BTreeMap::new(),
            drop: Vec::new(),
            redact: Vec::new(),
            redaction: DEFAULT_REDACTION.to_string(),
        }
    }
}

impl RewriteRules {
    /// Parse rules from YAML (or JSON, which YAML accepts)
    ///
    /// # Errors
    /// Returns an error if the text is not a valid ruleset
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid rewrite rules")
    }

    /// Load rules from a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rules file {}", path.display()))?;
        let rules = Self::from_yaml(&text)
            .with_context(|| format!("failed to load rules from {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            rename = rules.rename.len(),
            drop = rules.drop.len(),
            redact = rules.redact.len(),
            "loaded rewrite rules"
        );
        Ok(rules)
    }

    /// Whether applying the rules leaves every document unchanged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rename.is_empty() && self.drop.is_empty() && self.redact.is_empty()
    }

    /// Output name of `key`, or `None` if it is dropped
    #[must_use]
    pub fn target_name(&self, key: &str) -> Option<String> {
        if self.drop.iter().any(|dropped| dropped == key) {
            return None;
        }
        Some(self.rename.get(key).map_or_else(|| key.to_string(), Clone::clone))
    }

    fn redact_into(&self, node: &Node) {
        let Some(map) = node.as_map() else {
            return;
        };
        for key in &self.redact {
            if map.has_own(key) {
                map.insert(key.as_str(), self.redaction.as_str());
            }
        }
    }

    /// Build the transform applying these rules at every map
    #[must_use]
    pub fn to_transform(&self) -> Transform<Infallible> {
        let rules = Arc::new(self.clone());
        Transform::new(move |node| {
            if node.as_map().is_none() {
                return Ok(None);
            }
            let names = Arc::clone(&rules);
            let redacted = Arc::clone(&rules);
            let result = DirectResult::new()
                .with_key_mapper(move |key| names.target_name(key))
                .with_post_visit(move |rebuilt| {
                    redacted.redact_into(&rebuilt);
                    Ok(rebuilt)
                });
            Ok(Some(result))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let rules = RewriteRules::from_yaml("drop: [secret]").unwrap();
        assert_eq!(rules.drop, vec!["secret"]);
        assert!(rules.rename.is_empty());
        assert_eq!(rules.redaction, DEFAULT_REDACTION);
        assert!(!rules.is_empty());
    }

    #[test]
    fn json_rules_parse() {
        let rules =
            RewriteRules::from_yaml(r#"{"rename": {"a": "b"}, "redaction": "xxx"}"#).unwrap();
        assert_eq!(rules.rename.get("a").map(String::as_str), Some("b"));
        assert_eq!(rules.redaction, "xxx");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RewriteRules::from_yaml("renam: {a: b}").is_err());
    }

    #[test]
    fn drop_wins_over_rename() {
        let rules = RewriteRules {
            rename: BTreeMap::from([("a".to_string(), "b".to_string())]),
            drop: vec!["a".to_string()],
            ..RewriteRules::default()
        };
        assert_eq!(rules.target_name("a"), None);
        assert_eq!(rules.target_name("c"), Some("c".to_string()));
    }

    #[test]
    fn redaction_only_touches_present_keys() {
        let rules = RewriteRules {
            redact: vec!["password".to_string(), "token".to_string()],
            ..RewriteRules::default()
        };
        let node = Node::from(serde_json::json!({"password": "hunter2", "user": "bob"}));
        rules.redact_into(&node);
        assert_eq!(
            node,
            Node::from(serde_json::json!({"password": "[redacted]", "user": "bob"}))
        );
    }
}
