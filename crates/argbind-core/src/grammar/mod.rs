//! Usage grammar: docopt-like templates parsed once into a flat structure.
//!
//! ```text
//! channel create (<name>) (<bid> | --bid=<bid>) [--allow_duplicate_name]
//! ```
//!
//! becomes
//!
//! - command path `["channel", "create"]`
//! - positionals `name`, `bid` (in that order)
//! - options `--bid=<bid>`, `--allow_duplicate_name`
//! - required groups `{name}` and `{bid}` (the two spellings of `bid` collapse)
//!
//! The binder only ever sees [`Grammar`]; usage strings are never re-read at
//! call time.

mod lexer;
mod parser;

use serde::Serialize;

use self::{
    lexer::{tokenize, TokenKind},
    parser::{Node, Parser},
};
use crate::{error::GrammarSyntaxError, schema::ArgType, schema::Command};

// ═══════════════════════════════════════════════════════════════════════════
// GRAMMAR TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Positional {
    pub name: String,
    pub repeatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: String,
    pub takes_value: bool,
    pub repeatable: bool,
}

/// Arguments of which exactly one (`required`) or at most one may be supplied.
///
/// A required group with a single member is how a plain required argument is
/// represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutexGroup {
    pub required: bool,
    pub members: Vec<String>,
}

impl MutexGroup {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grammar {
    command_path: Vec<String>,
    positionals: Vec<Positional>,
    options: Vec<OptionSpec>,
    mutex_groups: Vec<MutexGroup>,
}

impl Grammar {
    #[must_use]
    pub fn command_path(&self) -> &[String] {
        &self.command_path
    }

    /// Positional slots in the order the CLI adapter fills them.
    #[must_use]
    pub fn positionals(&self) -> &[Positional] {
        &self.positionals
    }

    #[must_use]
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    #[must_use]
    pub fn mutex_groups(&self) -> &[MutexGroup] {
        &self.mutex_groups
    }

    /// Whether the argument must always be supplied on its own.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.mutex_groups
            .iter()
            .any(|group| group.required && group.members.len() == 1 && group.contains(name))
    }

    /// Index of the multi-member group the argument belongs to, if any.
    #[must_use]
    pub fn group_id(&self, name: &str) -> Option<usize> {
        self.mutex_groups
            .iter()
            .position(|group| group.members.len() > 1 && group.contains(name))
    }

    #[must_use]
    pub fn is_repeatable(&self, name: &str) -> bool {
        self.positionals
            .iter()
            .any(|p| p.name == name && p.repeatable)
            || self.options.iter().any(|o| o.name == name && o.repeatable)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════

impl Grammar {
    /// Parse a usage template.
    ///
    /// `cli` is the command path the template must start with; `lookup` returns
    /// the declared type of an argument name.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Brackets or parentheses are unbalanced, or a group is empty
    /// - A token is malformed, or `|` appears outside a group
    /// - `...` follows something other than a list argument
    /// - An argument is undeclared, or its token shape contradicts its type
    /// - The leading words are not `cli`
    pub fn parse<F>(usage: &str, cli: &str, lookup: F) -> Result<Self, GrammarSyntaxError>
    where
        F: Fn(&str) -> Option<ArgType>,
    {
        let tokens = tokenize(usage)?;
        let path_len = tokens
            .iter()
            .take_while(|t| matches!(t.kind, TokenKind::Word(_)))
            .count();
        let (path, body) = tokens.split_at(path_len);

        let command_path: Vec<String> = path
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Word(word) => Some(word.clone()),
                _ => None,
            })
            .collect();
        let found = command_path.join(" ");
        if found != cli {
            return Err(GrammarSyntaxError::CommandPath {
                expected: cli.to_string(),
                found,
            });
        }

        let nodes = Parser::new(body).parse()?;
        nodes.iter().try_for_each(|node| check_node(node, &lookup, false))?;

        let mut grammar = Self {
            command_path,
            ..Self::default()
        };
        grammar.collect(&nodes, true);
        Ok(grammar)
    }

    /// Grammar for a schema command: its usage lines (or bare `cli`) followed
    /// by the generated keyword block.
    pub(crate) fn for_command(command: &Command) -> Result<Self, GrammarSyntaxError> {
        let mut parts: Vec<String> = if command.desc().usage.is_empty() {
            vec![command.cli().to_string()]
        } else {
            command.desc().usage.clone()
        };
        parts.extend(command.kwargs_usage_flags());
        let usage = parts.join(" ");

        Self::parse(&usage, command.cli(), |name| {
            command.argument(name).map(|arg| arg.arg_type)
        })
    }

    fn collect(&mut self, nodes: &[Node], required: bool) {
        for node in nodes {
            self.collect_node(node, required, false);
        }
    }

    fn collect_node(&mut self, node: &Node, required: bool, repeatable: bool) {
        match node {
            Node::Positional { name } => {
                if !self.positionals.iter().any(|p| &p.name == name) {
                    self.positionals.push(Positional {
                        name: name.clone(),
                        repeatable,
                    });
                }
                if required {
                    self.require(vec![name.clone()]);
                }
            }
            Node::Option { name, takes_value } => {
                if !self.options.iter().any(|o| &o.name == name) {
                    self.options.push(OptionSpec {
                        name: name.clone(),
                        takes_value: *takes_value,
                        repeatable,
                    });
                }
                if required {
                    self.require(vec![name.clone()]);
                }
            }
            Node::Repeat(inner) => self.collect_node(inner, required, true),
            Node::Group {
                required: group_required,
                alternatives,
            } => {
                let required = required && *group_required;
                if let [only] = alternatives.as_slice() {
                    self.collect(only, required);
                    return;
                }

                let mut members = Vec::new();
                node.names(&mut members);
                for alternative in alternatives {
                    self.collect(alternative, false);
                }
                if members.len() > 1 {
                    self.mutex_groups.push(MutexGroup { required, members });
                } else if required {
                    self.require(members);
                }
            }
        }
    }

    fn require(&mut self, members: Vec<String>) {
        let group = MutexGroup {
            required: true,
            members,
        };
        if !self.mutex_groups.contains(&group) {
            self.mutex_groups.push(group);
        }
    }
}

/// Validate names and token shapes against the declared argument types.
fn check_node<F>(node: &Node, lookup: &F, repeated: bool) -> Result<(), GrammarSyntaxError>
where
    F: Fn(&str) -> Option<ArgType>,
{
    let declared = |name: &str| {
        lookup(name).ok_or_else(|| GrammarSyntaxError::UndeclaredArgument {
            argument: name.to_string(),
        })
    };

    match node {
        Node::Positional { name } => {
            let arg_type = declared(name)?;
            if arg_type.is_bool() {
                return Err(GrammarSyntaxError::FlagShape {
                    argument: name.clone(),
                    arg_type,
                    token: format!("<{name}>"),
                });
            }
            check_repeat(name, arg_type, repeated)
        }
        Node::Option { name, takes_value } => {
            let arg_type = declared(name)?;
            if arg_type.is_bool() == *takes_value {
                let token = if *takes_value {
                    format!("--{name}=<{name}>")
                } else {
                    format!("--{name}")
                };
                return Err(GrammarSyntaxError::FlagShape {
                    argument: name.clone(),
                    arg_type,
                    token,
                });
            }
            check_repeat(name, arg_type, repeated)
        }
        Node::Repeat(inner) => check_node(inner, lookup, true),
        Node::Group { alternatives, .. } => alternatives
            .iter()
            .flatten()
            .try_for_each(|child| check_node(child, lookup, false)),
    }
}

fn check_repeat(name: &str, arg_type: ArgType, repeated: bool) -> Result<(), GrammarSyntaxError> {
    if repeated && !arg_type.is_list() {
        return Err(GrammarSyntaxError::RepeatOnNonList {
            argument: name.to_string(),
            arg_type,
        });
    }
    Ok(())
}
