//! Stored help text must match what the renderer produces for every command.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use argbind_core::{check_help, help::render_markdown, render_help, verify_registry, Registry};

#[test]
fn test_every_command_renders_its_stored_help() {
    let registry = Registry::builtin().expect("built-in schema loads");
    for command in registry.commands() {
        assert_eq!(
            render_help(command),
            command.help(),
            "help drift in '{}'",
            command.key()
        );
    }
}

#[test]
fn test_registry_has_no_drift() {
    let registry = Registry::builtin().unwrap();
    assert!(verify_registry(&registry).is_empty());
    assert_eq!(registry.len(), 32);
}

#[test]
fn test_kwargs_block_wraps_at_offset() {
    let registry = Registry::builtin().unwrap();
    let command = registry.get("account_list").unwrap();
    let help = render_help(command);
    assert!(help.contains(
        "\n                 [--page=<page>] [--page_size=<page_size>] [--include_total]\n"
    ));
    assert!(check_help(command).is_ok());
}

#[test]
fn test_markdown_covers_every_command() {
    let registry = Registry::builtin().unwrap();
    let markdown = render_markdown(&registry);
    for command in registry.commands() {
        assert!(
            markdown.contains(&format!("### `{}`", command.cli())),
            "{} missing from reference",
            command.key()
        );
    }
}
