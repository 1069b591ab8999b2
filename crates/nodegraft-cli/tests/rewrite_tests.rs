use std::io::Write;

use nodegraft_cli::{read_document, render, rewrite, RewriteRules};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;

fn rules_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn yaml_rules_rewrite_nested_objects() {
    let file = rules_file(
        "rename:\n  user_name: name\ndrop: [internal_id]\nredact: [password]\n",
    );
    let rules = RewriteRules::from_path(file.path()).unwrap();

    let document = json!({
        "user_name": "ada",
        "internal_id": 7,
        "password": "hunter2",
        "friends": [
            {"user_name": "bob", "internal_id": 8, "password": "x"},
            {"user_name": "cy"}
        ]
    });
    let out = rewrite(document, &rules).unwrap();
    assert_eq!(
        out,
        json!({
            "name": "ada",
            "password": "[redacted]",
            "friends": [
                {"name": "bob", "password": "[redacted]"},
                {"name": "cy"}
            ]
        })
    );
}

#[test]
fn redaction_applies_to_renamed_keys() {
    let file = rules_file(r#"{"rename": {"pw": "password"}, "redact": ["password"], "redaction": "***"}"#);
    let rules = RewriteRules::from_path(file.path()).unwrap();

    let out = rewrite(json!({"pw": "secret", "keep": {"pw": 1}}), &rules).unwrap();
    assert_eq!(out, json!({"password": "***", "keep": {"password": "***"}}));
}

#[test]
fn empty_rules_preserve_document() {
    let rules = RewriteRules::default();
    let document = json!({"b": 1, "a": [null, true, {"z": "s"}]});
    assert_eq!(rewrite(document.clone(), &rules).unwrap(), document);
}

#[test]
fn key_order_survives_rewrite() {
    let rules = RewriteRules::from_yaml("rename: {b: beta}").unwrap();
    let out = rewrite(json!({"c": 3, "b": 2, "a": 1}), &rules).unwrap();
    assert_eq!(render(&out, false).unwrap(), r#"{"c":3,"beta":2,"a":1}"#);
}

#[test]
fn scalar_documents_pass_through() {
    let rules = RewriteRules::from_yaml("drop: [x]").unwrap();
    assert_eq!(rewrite(json!("x"), &rules).unwrap(), json!("x"));
    assert_eq!(rewrite(json!([1, 2]), &rules).unwrap(), json!([1, 2]));
}

#[test]
fn missing_rules_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = RewriteRules::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn malformed_rules_are_rejected() {
    let file = rules_file("drop: {not: a list}");
    assert!(RewriteRules::from_path(file.path()).is_err());
}

#[test]
fn documents_load_from_file() {
    let file = rules_file(r#"{"a": {"b": 1}}"#);
    let document = read_document(Some(file.path())).unwrap();
    assert_eq!(document, json!({"a": {"b": 1}}));

    let broken = rules_file("{not json");
    let err = read_document(Some(broken.path())).unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn pretty_rendering_spans_lines() {
    let text = render(&json!({"a": 1}), true).unwrap();
    assert_eq!(text, "{\n  \"a\": 1\n}");
}
