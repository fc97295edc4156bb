//! Schema registry: load the artifact once, validate it, intern shared keyword
//! blocks and parse every usage grammar before any call is bound.

use std::{path::Path, sync::Arc};

use im::OrdMap;
use itertools::Itertools;

use super::types::{
    Argument, ArgumentGroup, Command, CommandDoc, SchemaDoc, PAGINATION_TRIO,
};
use crate::{error::SchemaError, grammar::Grammar};

/// Artifact compiled into the binary.
pub const BUILTIN_SCHEMA: &str = include_str!("../../schema/interface.json");

/// Immutable set of commands, built once per process.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: OrdMap<String, String>,
    commands: OrdMap<String, Arc<Command>>,
    deprecated: OrdMap<String, Option<String>>,
    argument_groups: Vec<Arc<ArgumentGroup>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

impl Registry {
    /// Registry built from the artifact shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns error if the bundled artifact fails validation.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_json(BUILTIN_SCHEMA)
    }

    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails validation.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// # Errors
    ///
    /// Returns error if:
    /// - The text is not valid JSON or uses an unknown argument type
    /// - A command's key, group or `cli` disagree with each other
    /// - Argument names repeat, or `arguments` does not end with `kwargs`
    /// - A default does not match its argument's type
    /// - A usage grammar is malformed
    /// - A deprecated name shadows a command or group, or points at a missing command
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_json::from_str(text)?;
        Self::from_doc(doc)
    }

    /// # Errors
    ///
    /// See [`Registry::from_json`].
    pub fn from_doc(doc: SchemaDoc) -> Result<Self, SchemaError> {
        let mut argument_groups: Vec<Arc<ArgumentGroup>> = Vec::new();
        let mut commands = OrdMap::new();

        for (key, raw) in doc.commands {
            let command = build_command(&key, raw, &doc.groups, &mut argument_groups)?;
            commands.insert(key, Arc::new(command));
        }
        check_deprecated(&doc.deprecated, &commands, &doc.groups)?;

        tracing::debug!(
            commands = commands.len(),
            groups = doc.groups.len(),
            deprecated = doc.deprecated.len(),
            argument_groups = argument_groups.len(),
            "schema registry loaded"
        );

        Ok(Self {
            groups: doc.groups,
            commands,
            deprecated: doc.deprecated,
            argument_groups,
        })
    }
}

fn build_command(
    key: &str,
    raw: CommandDoc,
    groups: &OrdMap<String, String>,
    interned: &mut Vec<Arc<ArgumentGroup>>,
) -> Result<Command, SchemaError> {
    check_naming(key, &raw, groups)?;

    if let Some(name) = raw.arguments.iter().map(|arg| arg.name.as_str()).duplicates().next() {
        return Err(SchemaError::invalid(key, format!("argument '{name}' declared twice")));
    }

    if let Some(arg) = raw.arguments.iter().find(|arg| !arg.default_matches_type()) {
        return Err(SchemaError::invalid(
            key,
            format!("default for '{}' is not a {} value", arg.name, arg.arg_type),
        ));
    }

    let CommandDoc {
        name,
        desc,
        mut arguments,
        returns,
        kwargs,
        group,
        cli,
        help,
    } = raw;

    let kwargs = match kwargs {
        Some(block) => {
            let split = arguments.len().checked_sub(block.len()).ok_or_else(|| {
                SchemaError::invalid(key, "kwargs block is longer than the argument list")
            })?;
            if arguments[split..] != block[..] {
                return Err(SchemaError::invalid(
                    key,
                    "argument list does not end with the kwargs block",
                ));
            }
            arguments.truncate(split);
            Some(intern(key, block, interned))
        }
        None => None,
    };

    if desc.kwargs.is_some() && kwargs.is_none() {
        return Err(SchemaError::invalid(
            key,
            "usage reserves a kwargs column but no kwargs are declared",
        ));
    }

    let mut command = Command {
        key: key.to_string(),
        name,
        group,
        cli,
        desc,
        own_arguments: arguments,
        kwargs,
        returns,
        help,
        grammar: Grammar::default(),
    };
    command.grammar = Grammar::for_command(&command).map_err(|source| SchemaError::Grammar {
        command: key.to_string(),
        source,
    })?;
    Ok(command)
}

fn check_naming(
    key: &str,
    raw: &CommandDoc,
    groups: &OrdMap<String, String>,
) -> Result<(), SchemaError> {
    let (expected_key, expected_cli) = match &raw.group {
        Some(group) => {
            if !groups.contains_key(group) {
                return Err(SchemaError::invalid(key, format!("unknown group '{group}'")));
            }
            (format!("{group}_{}", raw.name), format!("{group} {}", raw.name))
        }
        None => (raw.name.clone(), raw.name.clone()),
    };

    if expected_key != key {
        return Err(SchemaError::invalid(
            key,
            format!("key does not match group and name (expected '{expected_key}')"),
        ));
    }
    if expected_cli != raw.cli {
        return Err(SchemaError::invalid(
            key,
            format!("cli '{}' should be '{expected_cli}'", raw.cli),
        ));
    }
    Ok(())
}

fn check_deprecated(
    deprecated: &OrdMap<String, Option<String>>,
    commands: &OrdMap<String, Arc<Command>>,
    groups: &OrdMap<String, String>,
) -> Result<(), SchemaError> {
    for (old, new) in deprecated {
        if commands.contains_key(old) || groups.contains_key(old) {
            return Err(SchemaError::invalid(
                old,
                "deprecated name is still a command or group",
            ));
        }
        if let Some(new) = new.as_deref().filter(|new| !commands.contains_key(*new)) {
            return Err(SchemaError::invalid(
                old,
                format!("deprecated in favour of unknown command '{new}'"),
            ));
        }
    }
    Ok(())
}

/// Return the shared copy of `block`, storing it on first sight.
///
/// The pagination trio is named `pagination`; any other block is named after
/// the first command (in key order) that declares it.
fn intern(
    key: &str,
    block: Vec<Argument>,
    interned: &mut Vec<Arc<ArgumentGroup>>,
) -> Arc<ArgumentGroup> {
    if let Some(existing) = interned.iter().find(|group| group.members == block) {
        return Arc::clone(existing);
    }

    let is_trio = block.len() == PAGINATION_TRIO.len()
        && block
            .iter()
            .zip(PAGINATION_TRIO)
            .all(|(arg, name)| arg.name == name);
    let name = if is_trio {
        "pagination".to_string()
    } else {
        key.to_string()
    };

    let group = Arc::new(ArgumentGroup {
        name,
        members: block,
    });
    interned.push(Arc::clone(&group));
    group
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERIES
// ═══════════════════════════════════════════════════════════════════════════

impl Registry {
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Look a command up by its flat key (the JSON-RPC method name).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<Command>> {
        self.commands.get(key)
    }

    /// Look up a retired method name.
    ///
    /// `Some(Some(key))` redirects to the command `key`; `Some(None)` means the
    /// name was dropped without a replacement.
    #[must_use]
    pub fn deprecated(&self, name: &str) -> Option<Option<&str>> {
        self.deprecated.get(name).map(Option::as_deref)
    }

    /// All commands in key order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.values()
    }

    /// Group names with their descriptions, in name order.
    pub fn groups(&self) -> impl Iterator<Item = (&String, &String)> {
        self.groups.iter()
    }

    #[must_use]
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    #[must_use]
    pub fn group_description(&self, group: &str) -> Option<&str> {
        self.groups.get(group).map(String::as_str)
    }

    pub fn group_commands<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Arc<Command>> {
        self.commands()
            .filter(move |command| command.group() == Some(group))
    }

    pub fn ungrouped_commands(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands().filter(|command| command.group().is_none())
    }

    /// Interned keyword blocks, in the order they were first seen.
    #[must_use]
    pub fn argument_groups(&self) -> &[Arc<ArgumentGroup>] {
        &self.argument_groups
    }

    /// Match the leading command-line words to a command.
    ///
    /// Returns the command and how many words named it (`account create` is 2,
    /// `get` is 1).
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, words: &[S]) -> Option<(&Arc<Command>, usize)> {
        let first = words.first()?.as_ref();
        if self.has_group(first) {
            let sub = words.get(1)?.as_ref();
            return self
                .get(&format!("{first}_{sub}"))
                .filter(|command| command.group() == Some(first))
                .map(|command| (command, 2));
        }
        self.get(first)
            .filter(|command| command.group().is_none())
            .map(|command| (command, 1))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════

    /// Rebuild the artifact document.
    #[must_use]
    pub fn to_doc(&self) -> SchemaDoc {
        SchemaDoc {
            groups: self.groups.clone(),
            commands: self
                .commands
                .iter()
                .map(|(key, command)| (key.clone(), command.to_doc()))
                .collect(),
            deprecated: self.deprecated.clone(),
        }
    }

    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(&self.to_doc())?)
    }
}
