//! # Argbind Core
//!
//! Schema-driven argument binding for a daemon that exposes the same commands
//! over a command line and over JSON-RPC.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Pipeline
//!
//! ```text
//! Registry (load once) -> Grammar (parsed once per command)
//!     -> bind (per call, CLI or RPC) -> pagination::normalize -> dispatch
//! ```
//!
//! The help renderer reads the registry directly and never touches live calls.
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Binding failures are
//! [`BindingError`] values with a stable [`ErrorCode`], an exit code for the CLI
//! and a JSON-RPC error code.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod bind;
pub mod coerce;
pub mod config;
pub mod engine;
mod error;
pub mod grammar;
pub mod help;
pub mod pagination;
pub mod schema;

pub use bind::{bind, ParamValue, ParameterMap, RawInput, RpcParams};
pub use coerce::{parse_constraint, CoercionError, ConstraintValue, EqualityConstraint, Operator};
pub use config::Config;
pub use engine::{Engine, Invocation};
pub use error::{BindingError, Error, ErrorCode, GrammarSyntaxError, SchemaError};
pub use grammar::{Grammar, MutexGroup};
pub use help::{check_help, render_help, render_markdown, verify_registry, HelpDrift};
pub use pagination::{paginate_list, PaginatedResult, PaginationRequest};
pub use schema::{ArgType, Argument, ArgumentGroup, Command, Registry};

/// Result type alias for argbind-core operations
pub type Result<T> = std::result::Result<T, Error>;
