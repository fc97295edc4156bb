//! Markdown API reference.

use itertools::Itertools;

use crate::schema::{ArgType, Argument, Command, Registry};

/// Render every command as Markdown: groups in name order, ungrouped
/// commands last.
#[must_use]
pub fn render_markdown(registry: &Registry) -> String {
    let mut out = String::from("# API Reference\n");

    for (group, description) in registry.groups() {
        out.push_str(&format!("\n## {group}\n\n{description}\n"));
        for command in registry.group_commands(group) {
            out.push_str(&command_section(command));
        }
    }

    let ungrouped: Vec<_> = registry.ungrouped_commands().collect();
    if !ungrouped.is_empty() {
        out.push_str("\n## Other commands\n");
        for command in ungrouped {
            out.push_str(&command_section(command));
        }
    }
    out
}

fn command_section(command: &Command) -> String {
    let desc = command.desc();
    let mut out = format!("\n### `{}`\n\n", command.cli());
    out.push_str(&format!("JSON-RPC method: `{}`\n\n", command.key()));
    if !desc.text.is_empty() {
        out.push_str(&desc.text.iter().map(|line| line.trim()).join(" "));
        out.push_str("\n\n");
    }

    let usage = if desc.usage.is_empty() {
        format!("    {}", command.cli())
    } else {
        desc.usage.join("\n")
    };
    out.push_str(&format!("```text\n{usage}\n```\n"));

    let arguments: Vec<&Argument> = command.arguments().collect();
    if !arguments.is_empty() {
        out.push_str("\n| Argument | Type | Description |\n| --- | --- | --- |\n");
        for arg in arguments {
            out.push_str(&argument_row(command, arg));
        }
    }

    let returns = command.returns();
    if let Some(return_type) = &returns.return_type {
        out.push_str(&format!("\nReturns `{return_type}`"));
        let comment = returns.desc.join(" ");
        if !comment.is_empty() {
            out.push_str(&format!(": {comment}"));
        }
        out.push('\n');
    }
    out
}

fn argument_row(command: &Command, arg: &Argument) -> String {
    let mut description = escape_cell(&arg.description());
    if command.grammar().is_required(&arg.name) {
        description = format!("*required* {description}").trim_end().to_string();
    }
    if let Some(default) = arg.default.as_ref().filter(|_| arg.arg_type != ArgType::Bool) {
        description.push_str(&format!(" (default: `{default}`)"));
    }
    format!("| `{}` | {} | {} |\n", arg.name, arg.arg_type, description.trim())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_reference_marks_required_arguments() {
        let registry = Registry::builtin().unwrap();
        let markdown = render_markdown(&registry);

        assert!(markdown.starts_with("# API Reference\n"));
        assert!(markdown.contains("\n### `account create`\n"));
        assert!(markdown.contains("JSON-RPC method: `account_create`"));
        assert!(markdown.contains("| `account_name` | str | *required* "));
        assert!(markdown.contains("| `language` | str | "));
        assert!(!markdown.contains("| `language` | str | *required*"));
    }

    #[test]
    fn test_ungrouped_commands_listed_last() {
        let registry = Registry::builtin().unwrap();
        let markdown = render_markdown(&registry);
        let other = markdown.find("## Other commands").unwrap();
        let stop = markdown.find("### `stop`").unwrap();
        let wallet = markdown.find("## wallet").unwrap();
        assert!(wallet < other && other < stop);
    }

    #[test]
    fn test_pipes_escaped() {
        assert_eq!(escape_cell("a | b"), "a \\| b");
    }
}
