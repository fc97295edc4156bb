//! Schema type definitions
//!
//! `*Doc` structs mirror the artifact layout field for field so a registry can
//! be exported back to the same JSON. [`Command`] and [`ArgumentGroup`] are the
//! interned, validated forms the rest of the crate works with.

use std::{fmt, str::FromStr, sync::Arc};

use im::OrdMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::grammar::Grammar;

/// Description phrase that opts an argument into the `>=400` comparison syntax.
pub const EQUALITY_CONSTRAINT_MARKER: &str = "supports equality constraints";

/// Names making up the shared pagination keyword block.
pub const PAGINATION_TRIO: [&str; 3] = ["page", "page_size", "include_total"];

// ═══════════════════════════════════════════════════════════════════════════
// ARGUMENT TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Declared type of an argument, as written in the artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum ArgType {
    #[strum(serialize = "str")]
    Str,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "bool")]
    Bool,
    #[strum(to_string = "str, list", serialize = "str,list")]
    StrList,
}

impl ArgType {
    #[must_use]
    pub const fn is_list(self) -> bool {
        matches!(self, Self::StrList)
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }
}

impl TryFrom<String> for ArgType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).map_err(|_| format!("unknown argument type '{value}'"))
    }
}

impl From<ArgType> for String {
    fn from(value: ArgType) -> Self {
        value.to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ARTIFACT DOCUMENTS
// ═══════════════════════════════════════════════════════════════════════════

/// One named, typed input to a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Argument {
    pub fn new(name: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            name: name.into(),
            desc: Vec::new(),
            arg_type,
            default: None,
        }
    }

    #[must_use]
    pub fn with_desc(mut self, line: impl Into<String>) -> Self {
        self.desc.push(line.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Description lines joined into a single sentence.
    #[must_use]
    pub fn description(&self) -> String {
        self.desc.join(" ")
    }

    #[must_use]
    pub fn supports_equality_constraints(&self) -> bool {
        self.description().contains(EQUALITY_CONSTRAINT_MARKER)
    }

    /// Flag as shown in the Options section: `--name` or `--name=<name>`.
    #[must_use]
    pub fn flag(&self) -> String {
        if self.arg_type.is_bool() {
            format!("--{}", self.name)
        } else {
            format!("--{0}=<{0}>", self.name)
        }
    }

    /// Optional usage element: `[--name]`, `[--name=<name>]` or `[--name=<name>...]`.
    #[must_use]
    pub fn usage_flag(&self) -> String {
        match self.arg_type {
            ArgType::Bool => format!("[--{}]", self.name),
            ArgType::StrList => format!("[--{0}=<{0}>...]", self.name),
            ArgType::Str | ArgType::Int => format!("[--{0}=<{0}>]", self.name),
        }
    }

    /// Whether `default` holds a value of the declared type.
    #[must_use]
    pub fn default_matches_type(&self) -> bool {
        self.default.as_ref().map_or(true, |value| match self.arg_type {
            ArgType::Str => value.is_string(),
            ArgType::Int => value.is_i64(),
            ArgType::Bool => value.is_boolean(),
            ArgType::StrList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        })
    }
}

/// Free text sections of a command's docstring.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usage: Vec<String>,
    /// Column where the generated keyword-argument usage block starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Returns {
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(rename = "type", default)]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

/// A command entry exactly as stored in the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDoc {
    pub name: String,
    pub desc: Description,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub returns: Returns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kwargs: Option<Vec<Argument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub cli: String,
    pub help: String,
}

/// The whole artifact: group descriptions plus commands keyed by flat name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaDoc {
    #[serde(default)]
    pub groups: OrdMap<String, String>,
    pub commands: OrdMap<String, CommandDoc>,
    /// Retired method names mapped to their replacement, or to `null` when
    /// the name was dropped without one.
    #[serde(default, skip_serializing_if = "OrdMap::is_empty")]
    pub deprecated: OrdMap<String, Option<String>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// INTERNED FORMS
// ═══════════════════════════════════════════════════════════════════════════

/// A keyword-argument block shared by several commands, stored once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentGroup {
    pub name: String,
    pub members: Vec<Argument>,
}

impl ArgumentGroup {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|arg| arg.name.as_str())
    }

    #[must_use]
    pub fn is_pagination(&self) -> bool {
        PAGINATION_TRIO
            .iter()
            .all(|wanted| self.names().any(|name| name == *wanted))
    }
}

/// A validated command with its usage grammar parsed.
#[derive(Debug, Clone)]
pub struct Command {
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) group: Option<String>,
    pub(crate) cli: String,
    pub(crate) desc: Description,
    pub(crate) own_arguments: Vec<Argument>,
    pub(crate) kwargs: Option<Arc<ArgumentGroup>>,
    pub(crate) returns: Returns,
    pub(crate) help: String,
    pub(crate) grammar: Grammar,
}

impl Command {
    /// Flat key, also the JSON-RPC method name (`account_create`).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Words typed on the command line (`account create`).
    #[must_use]
    pub fn cli(&self) -> &str {
        &self.cli
    }

    #[must_use]
    pub const fn desc(&self) -> &Description {
        &self.desc
    }

    #[must_use]
    pub const fn returns(&self) -> &Returns {
        &self.returns
    }

    /// Help text as stored in the artifact.
    #[must_use]
    pub fn help(&self) -> &str {
        &self.help
    }

    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// First line of the description, used in listings.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.desc.text.first().map_or("", |line| line.trim())
    }

    /// Arguments declared by this command alone, without the shared block.
    #[must_use]
    pub fn own_arguments(&self) -> &[Argument] {
        &self.own_arguments
    }

    #[must_use]
    pub const fn kwargs(&self) -> Option<&Arc<ArgumentGroup>> {
        self.kwargs.as_ref()
    }

    /// Every argument in declaration order: own arguments, then the shared block.
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.own_arguments.iter().chain(
            self.kwargs
                .iter()
                .flat_map(|group| group.members.iter()),
        )
    }

    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments().find(|arg| arg.name == name)
    }

    #[must_use]
    pub fn is_paginated(&self) -> bool {
        self.kwargs.as_ref().is_some_and(|group| group.is_pagination())
    }

    /// Usage elements generated for the shared keyword block.
    #[must_use]
    pub fn kwargs_usage_flags(&self) -> Vec<String> {
        self.kwargs
            .iter()
            .flat_map(|group| group.members.iter())
            .map(Argument::usage_flag)
            .collect()
    }

    /// Rebuild the artifact entry for this command.
    #[must_use]
    pub fn to_doc(&self) -> CommandDoc {
        CommandDoc {
            name: self.name.clone(),
            desc: self.desc.clone(),
            arguments: self.arguments().cloned().collect(),
            returns: self.returns.clone(),
            kwargs: self.kwargs.as_ref().map(|group| group.members.clone()),
            group: self.group.clone(),
            cli: self.cli.clone(),
            help: self.help.clone(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
