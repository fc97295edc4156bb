//! Error types for argbind-core with categorization:
//!
//! - **Binding errors**: caller input rejected for one call (exit code 2)
//! - **Schema errors**: the artifact or one of its usage grammars is malformed (exit code 3)
//! - **Configuration errors**: bad config file or environment value (exit code 1)
//!
//! Every class maps to a stable [`ErrorCode`] and to a JSON-RPC error code so the
//! CLI and RPC surfaces report the same failure the same way.

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};
use thiserror::Error;

use crate::schema::ArgType;

// ═══════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════

/// Machine-readable error code, serialized as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownArgument,
    MissingRequired,
    MutexViolation,
    TypeCoercion,
    PaginationRange,
    DuplicateArgument,
    GrammarSyntax,
    SchemaInvalid,
    UnknownCommand,
    DeprecatedCommand,
    InvalidParams,
    ConfigInvalid,
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// JSON-RPC `error.code` for this class.
    ///
    /// Binding classes use the server-defined range starting at -32001; the rest
    /// reuse the reserved codes from the JSON-RPC 2.0 specification.
    #[must_use]
    pub const fn rpc_code(self) -> i64 {
        match self {
            Self::UnknownArgument => -32001,
            Self::MissingRequired => -32002,
            Self::MutexViolation => -32003,
            Self::TypeCoercion => -32004,
            Self::PaginationRange => -32005,
            Self::DuplicateArgument => -32006,
            Self::UnknownCommand | Self::DeprecatedCommand => -32601,
            Self::InvalidParams => -32602,
            Self::GrammarSyntax | Self::SchemaInvalid | Self::ConfigInvalid | Self::IoError => {
                -32603
            }
        }
    }

    /// Process exit code used by the CLI.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::UnknownArgument
            | Self::MissingRequired
            | Self::MutexViolation
            | Self::TypeCoercion
            | Self::PaginationRange
            | Self::DuplicateArgument
            | Self::UnknownCommand
            | Self::DeprecatedCommand
            | Self::InvalidParams => 2,
            Self::ConfigInvalid => 1,
            Self::GrammarSyntax | Self::SchemaInvalid | Self::IoError => 3,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BINDING ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// A call was rejected while turning raw input into a parameter map.
///
/// Binding is all-or-nothing: when one of these is returned no parameters reach
/// the command implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("unknown argument(s): {}", .names.join(", "))]
    UnknownArgument { names: Vec<String> },

    #[error("missing required argument: {argument}")]
    MissingRequired { argument: String },

    #[error("{}", mutex_message(.members, .supplied, .required))]
    MutexViolation {
        members: Vec<String>,
        supplied: Vec<String>,
        required: bool,
    },

    #[error("argument '{argument}' expects {expected_type}, received '{received}'")]
    TypeCoercion {
        argument: String,
        expected_type: ArgType,
        received: String,
    },

    #[error("{argument} must be between 1 and {}, received {received}", u32::MAX)]
    PaginationRange { argument: String, received: i64 },

    #[error("argument '{argument}' supplied more than once")]
    DuplicateArgument { argument: String },
}

fn mutex_message(members: &[String], supplied: &[String], required: &bool) -> String {
    let quantity = if *required { "exactly one" } else { "at most one" };
    let got = if supplied.is_empty() {
        "none".to_string()
    } else {
        supplied.join(", ")
    };
    format!("{quantity} of {} must be supplied, got {got}", members.join(", "))
}

impl BindingError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownArgument { .. } => ErrorCode::UnknownArgument,
            Self::MissingRequired { .. } => ErrorCode::MissingRequired,
            Self::MutexViolation { .. } => ErrorCode::MutexViolation,
            Self::TypeCoercion { .. } => ErrorCode::TypeCoercion,
            Self::PaginationRange { .. } => ErrorCode::PaginationRange,
            Self::DuplicateArgument { .. } => ErrorCode::DuplicateArgument,
        }
    }

    /// Argument names involved in the failure, for structured error payloads.
    #[must_use]
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::UnknownArgument { names } => names.clone(),
            Self::MutexViolation { members, .. } => members.clone(),
            Self::MissingRequired { argument }
            | Self::TypeCoercion { argument, .. }
            | Self::PaginationRange { argument, .. }
            | Self::DuplicateArgument { argument } => vec![argument.clone()],
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    #[must_use]
    pub const fn rpc_code(&self) -> i64 {
        self.code().rpc_code()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GRAMMAR ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// A usage template could not be parsed. Fatal at registry load.
///
/// Positions are byte offsets into the usage text handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarSyntaxError {
    #[error("unclosed '{open}' opened at {position}")]
    UnclosedGroup { open: char, position: usize },

    #[error("unexpected '{close}' at {position}")]
    UnexpectedClose { close: char, position: usize },

    #[error("empty group at {position}")]
    EmptyGroup { position: usize },

    #[error("'|' outside of a group at {position}")]
    AlternationOutsideGroup { position: usize },

    #[error("malformed token '{token}' at {position}")]
    MalformedToken { token: String, position: usize },

    #[error("'...' at {position} does not follow an argument")]
    MisplacedRepeat { position: usize },

    #[error("'...' applied to '{argument}' which is {arg_type}, not a list")]
    RepeatOnNonList { argument: String, arg_type: ArgType },

    #[error("usage references undeclared argument '{argument}'")]
    UndeclaredArgument { argument: String },

    #[error("token '{token}' does not fit the {arg_type} argument '{argument}'")]
    FlagShape {
        argument: String,
        arg_type: ArgType,
        token: String,
    },

    #[error("usage starts with '{found}', expected '{expected}'")]
    CommandPath { expected: String, found: String },

    #[error("token pattern failed to compile: {0}")]
    Pattern(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// SCHEMA ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(String),

    #[error("failed to read schema {path}: {message}")]
    Io { path: String, message: String },

    #[error("command '{command}': {reason}")]
    InvalidCommand { command: String, reason: String },

    #[error("command '{command}' has a bad usage grammar: {source}")]
    Grammar {
        command: String,
        #[source]
        source: GrammarSyntaxError,
    },
}

impl SchemaError {
    pub fn invalid(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            command: command.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Grammar { .. } => ErrorCode::GrammarSyntax,
            Self::Io { .. } => ErrorCode::IoError,
            Self::Parse(_) | Self::InvalidCommand { .. } => ErrorCode::SchemaInvalid,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TOP-LEVEL ERROR
// ═══════════════════════════════════════════════════════════════════════════

/// Top-level error type for everything the engine can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} is permanently deprecated and does not have a replacement command")]
    Deprecated(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Binding(err) => err.code(),
            Self::Schema(err) => err.code(),
            Self::UnknownCommand(_) => ErrorCode::UnknownCommand,
            Self::Deprecated(_) => ErrorCode::DeprecatedCommand,
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::InvalidConfig(_) => ErrorCode::ConfigInvalid,
            Self::Io(_) => ErrorCode::IoError,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    #[must_use]
    pub const fn rpc_code(&self) -> i64 {
        self.code().rpc_code()
    }

    /// A short hint for the caller, if one applies.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Binding(BindingError::UnknownArgument { .. }) => {
                Some("Check the argument names with --help")
            }
            Self::Binding(BindingError::MutexViolation { .. }) => {
                Some("Supply exactly one of the listed arguments")
            }
            Self::UnknownCommand(_) | Self::Deprecated(_) => {
                Some("Run 'argbind schema list' to see available commands")
            }
            Self::InvalidConfig(_) => Some("Check ~/.config/argbind/config.toml and ARGBIND_* variables"),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(format!("Failed to parse config: {err}"))
    }
}
