//! CLI adapter: argv tokens after the command path.
//!
//! Accepted forms: positionals in grammar order, `--name=value`, `--name value`,
//! bare `--flag`, and `--` to end option parsing.

use super::{insert_once, push_token, type_error, Supplied, SuppliedMap};
use crate::{error::BindingError, grammar::Grammar, schema::Command};

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Positional(&'a str),
    Flag {
        name: &'a str,
        inline: Option<&'a str>,
        value: Option<&'a str>,
    },
}

pub(super) fn collect(
    command: &Command,
    grammar: &Grammar,
    argv: &[String],
) -> Result<SuppliedMap, BindingError> {
    let pieces = split(argv, |name| {
        command
            .argument(name)
            .is_some_and(|arg| !arg.arg_type.is_bool())
    });
    let mut supplied = SuppliedMap::new();
    let mut unknown: Vec<String> = Vec::new();

    // Positionals fill their slots before flags so list order follows argv.
    let mut positionals = pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Positional(value) => Some(*value),
            Piece::Flag { .. } => None,
        })
        .peekable();

    for slot in grammar.positionals() {
        if positionals.peek().is_none() {
            break;
        }
        let Some(arg) = command.argument(&slot.name) else {
            continue;
        };
        if slot.repeatable {
            for value in positionals.by_ref() {
                push_token(&mut supplied, arg, value.to_string())?;
            }
        } else if let Some(value) = positionals.next() {
            push_token(&mut supplied, arg, value.to_string())?;
        }
    }
    unknown.extend(positionals.map(str::to_string));

    for piece in &pieces {
        let Piece::Flag {
            name,
            inline,
            value,
        } = piece
        else {
            continue;
        };
        let Some(arg) = command.argument(name) else {
            unknown.push((*name).to_string());
            continue;
        };

        if arg.arg_type.is_bool() {
            if let Some(given) = inline {
                return Err(type_error(arg, *given));
            }
            insert_once(&mut supplied, arg, Supplied::Flag)?;
        } else {
            let given = value.ok_or_else(|| type_error(arg, ""))?;
            push_token(&mut supplied, arg, given.to_string())?;
        }
    }

    if unknown.is_empty() {
        Ok(supplied)
    } else {
        Err(BindingError::UnknownArgument { names: unknown })
    }
}

/// Classify tokens. `takes_value` says whether `--name` without `=` consumes
/// the following token.
fn split<F>(argv: &[String], takes_value: F) -> Vec<Piece<'_>>
where
    F: Fn(&str) -> bool,
{
    let mut pieces = Vec::with_capacity(argv.len());
    let mut tokens = argv.iter().map(String::as_str).peekable();
    let mut options_done = false;

    while let Some(token) = tokens.next() {
        if options_done {
            pieces.push(Piece::Positional(token));
            continue;
        }
        if token == "--" {
            options_done = true;
            continue;
        }

        let Some(flag) = token.strip_prefix("--") else {
            pieces.push(Piece::Positional(token));
            continue;
        };

        let piece = match flag.split_once('=') {
            Some((name, given)) => Piece::Flag {
                name,
                inline: Some(given),
                value: Some(given),
            },
            None => {
                let value = if takes_value(flag) {
                    tokens.next_if(|next| !next.starts_with("--"))
                } else {
                    None
                };
                Piece::Flag {
                    name: flag,
                    inline: None,
                    value,
                }
            }
        };
        pieces.push(piece);
    }
    pieces
}
