//! Loading then exporting the schema preserves it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use argbind_core::{
    schema::{SchemaDoc, BUILTIN_SCHEMA},
    ErrorCode, Registry, SchemaError,
};
use serde_json::{json, Value};

#[test]
fn test_export_matches_artifact() {
    let registry = Registry::builtin().unwrap();
    let exported: Value = serde_json::from_str(&registry.to_json_pretty().unwrap()).unwrap();
    let stored: Value = serde_json::from_str(BUILTIN_SCHEMA).unwrap();
    assert_eq!(exported, stored);
}

#[test]
fn test_reload_of_export_is_identical() {
    let registry = Registry::builtin().unwrap();
    let again = Registry::from_json(&registry.to_json_pretty().unwrap()).unwrap();
    assert_eq!(again.to_doc(), registry.to_doc());
}

#[test]
fn test_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interface.json");
    std::fs::write(&path, BUILTIN_SCHEMA).unwrap();
    let registry = Registry::from_path(&path).unwrap();
    assert_eq!(registry.len(), 32);

    let missing = Registry::from_path(&dir.path().join("nope.json"));
    assert!(matches!(missing, Err(SchemaError::Io { .. })));
}

#[test]
fn test_pagination_block_shared_by_identity() {
    let registry = Registry::builtin().unwrap();
    let account = registry.get("account_list").unwrap().kwargs().unwrap();
    let wallet = registry.get("wallet_list").unwrap().kwargs().unwrap();
    assert!(Arc::ptr_eq(account, wallet));
    assert_eq!(account.name, "pagination");
}

#[test]
fn test_group_listing() {
    let registry = Registry::builtin().unwrap();
    assert_eq!(registry.groups().count(), 11);
    let account: Vec<&str> = registry.group_commands("account").map(|c| c.name()).collect();
    assert_eq!(account, vec!["add", "balance", "create", "list", "remove"]);
    let (command, words) = registry.resolve(&["account", "create", "x"]).unwrap();
    assert_eq!((command.key(), words), ("account_create", 2));
    assert!(registry.resolve(&["create"]).is_none());
}

#[test]
fn test_bad_usage_fails_load() {
    let doc: SchemaDoc = serde_json::from_value(json!({
        "groups": {},
        "commands": {
            "stop": {
                "name": "stop",
                "desc": {"text": ["Stop."], "usage": ["    stop [<force>"]},
                "arguments": [{"name": "force", "type": "str", "desc": []}],
                "returns": {"desc": [], "type": null},
                "cli": "stop",
                "help": ""
            }
        }
    }))
    .unwrap();
    let err = Registry::from_doc(doc).unwrap_err();
    assert_eq!(err.code(), ErrorCode::GrammarSyntax);
}

#[test]
fn test_default_of_wrong_type_fails_load() {
    let doc: SchemaDoc = serde_json::from_value(json!({
        "groups": {},
        "commands": {
            "stop": {
                "name": "stop",
                "desc": {"text": ["Stop."]},
                "arguments": [{"name": "nout", "type": "int", "desc": [], "default": "0"}],
                "returns": {"desc": [], "type": null},
                "cli": "stop",
                "help": ""
            }
        }
    }))
    .unwrap();
    assert_eq!(Registry::from_doc(doc).unwrap_err().code(), ErrorCode::SchemaInvalid);
}

#[test]
fn test_builtin_retired_names_survive_export() {
    let registry = Registry::builtin().unwrap();
    assert_eq!(registry.deprecated("daemon_stop"), Some(Some("stop")));
    let again = Registry::from_json(&registry.to_json_pretty().unwrap()).unwrap();
    assert_eq!(again.deprecated("daemon_stop"), Some(Some("stop")));
}
