//! Loading-focused tests for configuration
//!
//! Tests touching `ARGBIND_*` variables run serially.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{fs, path::Path};

use serial_test::serial;
use tempfile::TempDir;

use crate::{
    config::{global_config_path, load_layers, load_toml_file, project_config_path, Config},
    ErrorCode,
};

const ENV_VARS: [&str; 4] = [
    "ARGBIND_SCHEMA_PATH",
    "ARGBIND_DEFAULT_PAGE_SIZE",
    "ARGBIND_OUTPUT_JSON",
    "ARGBIND_OUTPUT_PRETTY",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_no_config_files_returns_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config = load_layers(None, &dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_project_file_overrides_global_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let global = write(
        &dir,
        "global.toml",
        "[pagination]\ndefault_page_size = 50\n[output]\npretty = true\n",
    );
    let project = write(&dir, "project.toml", "[pagination]\ndefault_page_size = 10\n");

    let config = load_layers(Some(&global), &project).unwrap();
    assert_eq!(config.pagination.default_page_size, 10);
    assert!(config.output.pretty);
}

#[test]
#[serial]
fn test_project_file_restores_default_values() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let global = write(
        &dir,
        "global.toml",
        "[pagination]\ndefault_page_size = 50\n[output]\njson = true\n",
    );
    let project = write(
        &dir,
        "project.toml",
        "[pagination]\ndefault_page_size = 20\n[output]\njson = false\n",
    );

    let config = load_layers(Some(&global), &project).unwrap();
    assert_eq!(config.pagination.default_page_size, 20);
    assert!(!config.output.json);
}

#[test]
fn test_layer_leaves_unset_keys_empty() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "partial.toml", "[output]\njson = false\n");
    let layer = load_toml_file(&path).unwrap();
    assert_eq!(layer.output.json, Some(false));
    assert_eq!(layer.output.pretty, None);
    assert_eq!(layer.pagination.default_page_size, None);
    assert_eq!(layer.schema_path, None);
}

#[test]
#[serial]
fn test_env_overrides_files() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let project = write(&dir, "project.toml", "[pagination]\ndefault_page_size = 10\n");
    let schema = write(&dir, "interface.json", "{}");

    std::env::set_var("ARGBIND_DEFAULT_PAGE_SIZE", "75");
    std::env::set_var("ARGBIND_OUTPUT_JSON", "true");
    std::env::set_var("ARGBIND_SCHEMA_PATH", &schema);
    let config = load_layers(None, &project);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.pagination.default_page_size, 75);
    assert!(config.output.json);
    assert_eq!(config.schema_path.as_deref(), Some(schema.as_path()));
}

#[test]
#[serial]
fn test_invalid_env_value_is_config_error() {
    clear_env();
    std::env::set_var("ARGBIND_OUTPUT_JSON", "yes please");
    let result = Config::default().apply_env_vars();
    clear_env();

    let err = result.expect_err("non-boolean value must be rejected");
    assert_eq!(err.code(), ErrorCode::ConfigInvalid);
    assert!(err.to_string().contains("ARGBIND_OUTPUT_JSON"));
}

#[test]
#[serial]
fn test_zero_page_size_from_env_fails_validation() {
    clear_env();
    let dir = TempDir::new().unwrap();
    std::env::set_var("ARGBIND_DEFAULT_PAGE_SIZE", "0");
    let result = load_layers(None, &dir.path().join("missing.toml"));
    clear_env();
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.toml", "default_page_size = \n invalid toml [[[");
    let err = load_toml_file(&path).expect_err("malformed TOML must fail");
    assert_eq!(err.code(), ErrorCode::ConfigInvalid);
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_directory_is_not_a_config_file() {
    let dir = TempDir::new().unwrap();
    let err = load_toml_file(dir.path()).expect_err("directory must be rejected");
    assert_eq!(err.code(), ErrorCode::IoError);
}

#[test]
fn test_config_paths() {
    assert!(project_config_path()
        .unwrap()
        .ends_with(Path::new(".argbind/config.toml")));
    if let Some(global) = global_config_path() {
        assert!(global.ends_with("config.toml"));
    }
}
