//! Help rendering.
//!
//! The `help` field stored with every command is generated from the rest of its
//! entry. [`render_help`] reproduces that text so the two can be compared; any
//! difference means the artifact was edited by hand or the generator changed.
//!
//! # Module Structure
//!
//! - `check`: drift detection against the stored text
//! - `docs`: Markdown API reference for a whole registry

mod check;
mod docs;

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};

pub use check::{check_help, verify_registry, HelpDrift};
pub use docs::render_markdown;

use crate::schema::{ArgType, Argument, Command};

/// Column limit for every wrapped line.
pub const LINE_WIDTH: usize = 90;

const INDENT: &str = "    ";

/// One line of the Options section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionLine {
    pub text: String,
    /// Wrapped tail of a description rather than the line naming the flag.
    pub continuation: bool,
}

/// Regenerate the help text for `command`.
#[must_use]
pub fn render_help(command: &Command) -> String {
    let desc = command.desc();
    let mut lines: Vec<String> = desc.text.clone();
    lines.push(String::new());

    lines.push("Usage:".to_string());
    if desc.usage.is_empty() {
        lines.push(format!("{INDENT}{}", command.cli()));
    } else {
        lines.extend(desc.usage.iter().cloned());
    }
    if let Some(offset) = desc.kwargs.filter(|offset| *offset > 0) {
        let flags = command.kwargs_usage_flags().join(" ");
        let pad = " ".repeat(offset);
        lines.extend(
            wrap(&flags, LINE_WIDTH.saturating_sub(offset))
                .into_iter()
                .map(|line| format!("{pad}{line}")),
        );
    }
    lines.push(String::new());

    let arguments: Vec<&Argument> = command.arguments().collect();
    if !desc.options.is_empty() || !arguments.is_empty() {
        lines.push("Options:".to_string());
        lines.extend(desc.options.iter().cloned());
        lines.extend(render_options(&arguments).into_iter().map(|line| line.text));
        lines.push(String::new());
    }

    let returns = command.returns();
    if !desc.returns.is_empty() || returns.return_type.is_some() {
        lines.push("Returns:".to_string());
        if let Some(return_type) = &returns.return_type {
            lines.push(format!("{INDENT}({return_type}) {}", returns.desc.join(" ")));
        }
        lines.extend(desc.returns.iter().cloned());
        if let Some(shape) = &returns.json {
            lines.extend(pretty_json(shape).lines().map(|line| format!("{INDENT}{line}")));
        }
    }

    lines.join("\n")
}

/// Options section entries, one or more lines per argument.
pub(crate) fn render_options(arguments: &[&Argument]) -> Vec<OptionLine> {
    let flags: Vec<String> = arguments.iter().map(|arg| arg.flag()).collect();
    let column = flags.iter().map(String::len).max().unwrap_or(0) + 2;

    let mut lines = Vec::new();
    for (flag, arg) in flags.iter().zip(arguments) {
        let left = format!("{INDENT}{flag:<column$}: ");
        let mut text = format!("({}) {}", arg.arg_type, arg.description());
        if let Some(default) = shown_default(arg) {
            text.push_str(&format!(" [default: {default}]"));
        }

        let mut wrapped = wrap(&text, LINE_WIDTH.saturating_sub(left.len())).into_iter();
        lines.push(OptionLine {
            text: format!("{left}{}", wrapped.next().unwrap_or_default()),
            continuation: false,
        });
        let pad = " ".repeat(left.len() + 1);
        lines.extend(wrapped.map(|line| OptionLine {
            text: format!("{pad}{line}"),
            continuation: true,
        }));
    }
    lines
}

/// Default as printed after the description; booleans never show one.
fn shown_default(arg: &Argument) -> Option<String> {
    if arg.arg_type == ArgType::Bool {
        return None;
    }
    arg.default.as_ref().map(|value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

/// Greedy word wrap on whitespace. Words longer than `width` get a line of
/// their own.
#[must_use]
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// JSON with four-space indentation, keys in stored order.
fn pretty_json(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT.as_bytes()));
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn test_wrap_greedy() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("  aa   bb  ", 90), vec!["aa bb"]);
        assert_eq!(wrap("toolongword x", 4), vec!["toolongword", "x"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let shape = json!({"b": "x", "a": [{"c": "y"}], "e": []});
        assert_eq!(
            pretty_json(&shape),
            "{\n    \"b\": \"x\",\n    \"a\": [\n        {\n            \"c\": \"y\"\n        }\n    ],\n    \"e\": []\n}"
        );
    }

    #[test]
    fn test_options_align_and_continue() {
        let long = Argument::new("confirmations", ArgType::Int)
            .with_desc("required confirmations for account balance")
            .with_default(json!(0));
        let flag = Argument::new("include_seed", ArgType::Bool)
            .with_desc("include the seed phrase")
            .with_default(json!(false));
        let account = Argument::new("account_id", ArgType::Str).with_desc("show specific wallet only");
        let lines = render_options(&[&account, &long, &flag]);

        assert_eq!(
            lines[0].text,
            "    --account_id=<account_id>        : (str) show specific wallet only"
        );
        assert_eq!(
            lines[1].text,
            "    --confirmations=<confirmations>  : (int) required confirmations for account balance"
        );
        assert_eq!(lines[2].text, "                                        [default: 0]");
        assert!(lines[2].continuation);
        assert_eq!(
            lines[3].text,
            "    --include_seed                   : (bool) include the seed phrase"
        );
    }

    #[test]
    fn test_string_default_is_unquoted() {
        let arg = Argument::new("language", ArgType::Str).with_default(json!("en"));
        assert_eq!(shown_default(&arg).as_deref(), Some("en"));
    }
}
