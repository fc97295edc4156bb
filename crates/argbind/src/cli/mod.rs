pub mod handlers;

use argbind_core::{Command as SchemaCommand, Registry};
use clap::{value_parser, Arg, ArgAction, Command};
use itertools::Itertools;

/// Ungrouped commands listed before the rest in root help.
const LEADING_COMMANDS: [&str; 3] = ["stop", "get", "resolve"];

/// Build the top-level parser. Schema commands arrive as external
/// subcommands and are bound by the engine, not by clap.
pub fn build_cli(registry: &Registry) -> Command {
    Command::new("argbind")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Schema-driven command line and JSON-RPC front end")
        .arg_required_else_help(true)
        .allow_external_subcommands(true)
        .external_subcommand_value_parser(value_parser!(String))
        .disable_help_subcommand(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results and errors as JSON"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Indent JSON output"),
        )
        .after_help(command_listing(registry))
        .subcommand(cmd_rpc())
        .subcommand(cmd_schema())
}

fn cmd_rpc() -> Command {
    Command::new("rpc").about("Serve line-delimited JSON-RPC 2.0 on stdin/stdout")
}

fn cmd_schema() -> Command {
    Command::new("schema")
        .about("Inspect the loaded command schema")
        .subcommand_required(true)
        .subcommand(Command::new("check").about("Verify stored help text against the renderer"))
        .subcommand(Command::new("list").about("List every command"))
        .subcommand(
            Command::new("show")
                .about("Show one command's help (or its schema entry with --json)")
                .arg(
                    Arg::new("command")
                        .required(true)
                        .num_args(1..=2)
                        .help("Command words (`account create`) or method name (`account_create`)"),
                ),
        )
        .subcommand(Command::new("docs").about("Print a Markdown API reference"))
}

/// Root help footer: groups, then ungrouped commands.
fn command_listing(registry: &Registry) -> String {
    let groups: Vec<(&String, &String)> = registry.groups().collect();
    let commands: Vec<&SchemaCommand> = registry
        .ungrouped_commands()
        .map(|command| &**command)
        .sorted_by_key(|command| {
            let rank = LEADING_COMMANDS
                .iter()
                .position(|name| *name == command.name())
                .unwrap_or(LEADING_COMMANDS.len());
            (rank, command.name().to_string())
        })
        .collect();

    let width = groups
        .iter()
        .map(|(name, _)| name.len())
        .chain(commands.iter().map(|command| command.name().len()))
        .max()
        .unwrap_or(0);

    let mut out = String::from("Groups:\n");
    for (name, description) in groups {
        out.push_str(&format!("  {name:<width$}  {description}\n"));
    }
    out.push_str("\nCommands:\n");
    for command in commands {
        out.push_str(&format!("  {:<width$}  {}\n", command.name(), command.summary()));
    }
    out.push_str("\nRun 'argbind <group>' to list a group's commands, or add --help to any command.");
    out
}

/// Command listing for one group.
#[must_use]
pub fn group_listing(registry: &Registry, group: &str) -> Option<String> {
    let description = registry.group_description(group)?;
    let commands: Vec<_> = registry.group_commands(group).collect();
    let width = commands
        .iter()
        .map(|command| command.name().len())
        .max()
        .unwrap_or(0);

    let mut out = format!("{description}\n\nUsage:\n    argbind {group} <command> [<args>...]\n\nCommands:\n");
    for command in commands {
        out.push_str(&format!("  {:<width$}  {}\n", command.name(), command.summary()));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli(&Registry::builtin().unwrap()).debug_assert();
    }

    #[test]
    fn test_root_listing_puts_common_commands_first() {
        let listing = command_listing(&Registry::builtin().unwrap());
        let commands = listing.split("\nCommands:\n").nth(1).unwrap();
        let names: Vec<&str> = commands
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .take(3)
            .collect();
        assert_eq!(names, vec!["stop", "get", "resolve"]);
        assert!(listing.contains("  account "));
    }

    #[test]
    fn test_group_listing() {
        let registry = Registry::builtin().unwrap();
        let listing = group_listing(&registry, "wallet").unwrap();
        assert!(listing.contains("argbind wallet <command>"));
        assert!(listing.contains("  balance"));
        assert!(group_listing(&registry, "nope").is_none());
    }
}
