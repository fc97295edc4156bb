//! Schema registry and the types it is made of.
//!
//! # Module Structure
//!
//! - `types`: artifact documents plus the interned [`Command`] / [`ArgumentGroup`]
//! - `registry`: loading, validation, interning, lookup and export

mod registry;
mod types;

pub use registry::{Registry, BUILTIN_SCHEMA};
pub use types::{
    ArgType, Argument, ArgumentGroup, Command, CommandDoc, Description, Returns, SchemaDoc,
    EQUALITY_CONSTRAINT_MARKER, PAGINATION_TRIO,
};
