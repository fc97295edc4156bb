// End-to-end checks of the argbind binary: command lines, help text, JSON
// envelopes and the stdio JSON-RPC server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use argbind_core::{schema::BUILTIN_SCHEMA, Registry};
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A command isolated from the developer's config files and environment.
fn argbind(home: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_argbind"));
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("ARGBIND_SCHEMA_PATH")
        .env_remove("ARGBIND_DEFAULT_PAGE_SIZE")
        .env_remove("ARGBIND_OUTPUT_JSON")
        .env_remove("ARGBIND_OUTPUT_PRETTY");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn binds_positional_account_name() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["account", "create", "savings", "--single_key"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["method"], json!("account_create"));
    assert_eq!(result["params"]["account_name"], json!("savings"));
    assert_eq!(result["params"]["single_key"], json!(true));
    assert_eq!(result["params"]["language"], json!("en"));
}

#[test]
fn json_mode_wraps_result() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["--json", "wallet", "balance"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let envelope = stdout_json(&output);
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["result"]["method"], json!("wallet_balance"));
}

#[test]
fn json_flag_after_command_words_is_honoured() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["account", "add", "imported", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let envelope = stdout_json(&output);
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["error"]["code"], json!("MUTEX_VIOLATION"));
    assert_eq!(
        envelope["error"]["details"]["arguments"],
        json!(["seed", "private_key", "public_key"])
    );
}

#[test]
fn command_help_is_stored_help() {
    let home = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let expected = format!("{}\n", registry.get("account_create").unwrap().help());

    argbind(&home)
        .args(["account", "create", "--help"])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn group_alone_lists_its_commands() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .arg("txo")
        .assert()
        .success()
        .stdout(predicate::str::contains("argbind txo <command>"))
        .stdout(predicate::str::contains("  list"))
        .stdout(predicate::str::contains("  sum"));
}

#[test]
fn zero_page_size_shows_usage_and_fails() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .args(["wallet", "list", "--page_size=0"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage:"))
        .stderr(predicate::str::contains("Error: page_size must be between 1"));
}

#[test]
fn paginated_command_gets_page_envelope() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["claim", "search", "--page=2", "--page_size=5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let page = stdout_json(&output);
    assert_eq!(page["page"], json!(2));
    assert_eq!(page["page_size"], json!(5));
    assert_eq!(page["items"], json!([]));
}

#[test]
fn configured_page_size_is_used() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .env("ARGBIND_DEFAULT_PAGE_SIZE", "3")
        .args(["txo", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["page_size"], json!(3));
}

#[test]
fn project_config_enables_json_output() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join(".argbind")).unwrap();
    std::fs::write(
        home.path().join(".argbind/config.toml"),
        "[output]\njson = true\n",
    )
    .unwrap();

    let output = argbind(&home).arg("status").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["success"], json!(true));
}

#[test]
fn unknown_command_exits_two() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .args(["account", "explode"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown command: account explode"))
        .stderr(predicate::str::contains("argbind schema list"));
}

#[test]
fn unknown_argument_reported() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .args(["stop", "--colour=red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown argument(s): colour"));
}

#[test]
fn schema_check_reports_no_drift() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .args(["schema", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("32 commands, no help drift"));
}

#[test]
fn schema_show_accepts_method_name() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["schema", "show", "txo_sum", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["result"]["cli"], json!("txo sum"));
}

#[test]
fn schema_docs_is_markdown() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .args(["schema", "docs"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# API Reference"));
}

#[test]
fn broken_schema_path_fails_at_startup() {
    let home = TempDir::new().unwrap();
    let schema = home.path().join("interface.json");
    std::fs::write(&schema, "{").unwrap();
    argbind(&home)
        .env("ARGBIND_SCHEMA_PATH", &schema)
        .arg("stop")
        .assert()
        .code(3)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn version_flag() {
    let home = TempDir::new().unwrap();
    argbind(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rpc_serves_stdin() {
    let home = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"account_create","params":[["savings"]]}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"account_add","params":{"account_name":"x"}}"#,
        "\n",
    );
    let output = argbind(&home)
        .arg("rpc")
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let mut responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    responses.sort_by_key(|response| response["id"].as_i64());
    assert_eq!(responses.len(), 2);
    assert_eq!(
        responses[0]["result"]["params"]["account_name"],
        json!("savings")
    );
    assert_eq!(responses[1]["error"]["code"], json!(-32003));
}

#[test]
fn option_value_that_looks_like_help_is_bound() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home)
        .args(["account", "create", "--account_name", "-h"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["params"]["account_name"], json!("-h"));
}

#[test]
fn retired_command_runs_its_replacement() {
    let home = TempDir::new().unwrap();
    let output = argbind(&home).arg("daemon_stop").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["method"], json!("stop"));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("deprecated"), "{stderr}");
}

#[test]
fn permanently_retired_command_fails() {
    let home = TempDir::new().unwrap();
    let mut schema: Value = serde_json::from_str(BUILTIN_SCHEMA).unwrap();
    schema["deprecated"]["report_bug"] = Value::Null;
    let path = home.path().join("interface.json");
    std::fs::write(&path, schema.to_string()).unwrap();

    argbind(&home)
        .env("ARGBIND_SCHEMA_PATH", &path)
        .arg("report_bug")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "report_bug is permanently deprecated and does not have a replacement command",
        ));

    let output = argbind(&home)
        .env("ARGBIND_SCHEMA_PATH", &path)
        .arg("rpc")
        .write_stdin("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"report_bug\"}\n")
        .output()
        .unwrap();
    let response = stdout_json(&output);
    assert_eq!(response["error"]["code"], json!(-32601));
    assert_eq!(response["error"]["data"]["code"], json!("DEPRECATED_COMMAND"));
}

#[test]
fn rpc_serves_retired_method_and_legacy_request() {
    let home = TempDir::new().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"daemon_stop"}"#,
        "\n",
        r#"{"method":"status","params":{}}"#,
        "\n",
    );
    let output = argbind(&home)
        .arg("rpc")
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    let retired = responses.iter().find(|r| r["id"] == json!(1)).unwrap();
    assert_eq!(retired["result"]["method"], json!("stop"));
    let legacy = responses.iter().find(|r| r["id"].is_null()).unwrap();
    assert_eq!(legacy["result"]["method"], json!("status"));
}
