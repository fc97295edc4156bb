//! Argbind - schema-driven command line and JSON-RPC front end.
//!
//! Every command is described once in the schema artifact. This crate exposes
//! those commands as `argbind <group> <command> ...` and as JSON-RPC methods
//! over stdio, binding arguments through [`argbind_core::Engine`] before
//! handing them to a [`dispatch::Dispatch`] implementation.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod dispatch;
pub mod json;
pub mod rpc;
