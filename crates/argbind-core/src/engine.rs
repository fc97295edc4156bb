//! Engine: a loaded registry plus configuration, ready to bind calls.
//!
//! Built once at startup and shared read-only (`Arc<Engine>`) by every
//! transport.

use std::sync::Arc;

use either::Either;
use serde_json::Value;

use crate::{
    bind::{bind, ParameterMap, RpcParams},
    config::Config,
    pagination::{self, PaginationRequest},
    schema::{Command, Registry},
    Error, Result,
};

/// A bound call, ready for dispatch.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: Arc<Command>,
    pub params: ParameterMap,
    /// Present only for commands carrying the pagination block.
    pub pagination: Option<PaginationRequest>,
}

#[derive(Debug, Clone)]
pub struct Engine {
    registry: Registry,
    config: Config,
}

impl Engine {
    #[must_use]
    pub const fn new(registry: Registry, config: Config) -> Self {
        Self { registry, config }
    }

    /// Load the schema named by `config`, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns error if the schema cannot be read or fails validation.
    pub fn load(config: Config) -> Result<Self> {
        let registry = match &config.schema_path {
            Some(path) => Registry::from_path(path)?,
            None => Registry::builtin()?,
        };
        tracing::debug!(
            commands = registry.len(),
            source = %config
                .schema_path
                .as_ref()
                .map_or_else(|| "builtin".to_string(), |path| path.display().to_string()),
            "schema loaded"
        );
        Ok(Self::new(registry, config))
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Bind a command line: command words first, then its arguments.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCommand` if the leading words name no command,
    /// `Deprecated` for a retired name without a replacement, otherwise the
    /// binding or pagination failure.
    pub fn bind_cli<S: AsRef<str>>(&self, argv: &[S]) -> Result<Invocation> {
        let (command, consumed) = match self.registry.resolve(argv) {
            Some(found) => found,
            None => {
                let first = argv.first().map_or("", AsRef::as_ref);
                let command = self.replacement(first)?.ok_or_else(|| {
                    Error::UnknownCommand(
                        argv.iter()
                            .take(2)
                            .map(AsRef::as_ref)
                            .collect::<Vec<_>>()
                            .join(" "),
                    )
                })?;
                (command, 1)
            }
        };
        let rest: Vec<String> = argv
            .iter()
            .skip(consumed)
            .map(|token| token.as_ref().to_string())
            .collect();
        self.bind_command(command, Either::Left(rest.as_slice()))
    }

    /// Bind a JSON-RPC call.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCommand` for an unknown method, `Deprecated` for a
    /// retired method without a replacement, `InvalidParams` for a `params`
    /// value of the wrong shape, otherwise the binding or pagination failure.
    pub fn bind_rpc(&self, method: &str, params: &Value) -> Result<Invocation> {
        let command = match self.registry.get(method) {
            Some(command) => command,
            None => self
                .replacement(method)?
                .ok_or_else(|| Error::UnknownCommand(method.to_string()))?,
        };
        let params = RpcParams::from_value(params).map_err(Error::InvalidParams)?;
        self.bind_command(command, Either::Right(&params))
    }

    /// The command standing in for a retired name, if `name` is one.
    fn replacement(&self, name: &str) -> Result<Option<&Arc<Command>>> {
        match self.registry.deprecated(name) {
            None => Ok(None),
            Some(None) => {
                tracing::warn!(method = name, "permanently deprecated command called");
                Err(Error::Deprecated(name.to_string()))
            }
            Some(Some(new)) => {
                tracing::warn!(
                    method = name,
                    replacement = new,
                    "command is deprecated, please update to use its replacement"
                );
                Ok(self.registry.get(new))
            }
        }
    }

    fn bind_command(
        &self,
        command: &Arc<Command>,
        input: Either<&[String], &RpcParams>,
    ) -> Result<Invocation> {
        let params = bind(command, command.grammar(), input)?;
        let (params, pagination) =
            pagination::normalize(command, params, self.config.default_page_size())?;
        Ok(Invocation {
            command: Arc::clone(command),
            params,
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use serde_json::json;

    use super::*;
    use crate::{bind::ParamValue, BindingError, ErrorCode};

    fn engine() -> Engine {
        Engine::load(Config::default()).unwrap()
    }

    #[test]
    fn test_cli_resolves_grouped_command() {
        let call = engine().bind_cli(&["account", "balance"]).unwrap();
        assert_eq!(call.command.key(), "account_balance");
        assert!(call.pagination.is_none());
    }

    #[test]
    fn test_unknown_command() {
        let err = engine().bind_cli(&["account", "explode"]).unwrap_err();
        assert_eq!(err, Error::UnknownCommand("account explode".into()));
        let err = engine().bind_rpc("account_explode", &json!({})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownCommand);
    }

    fn engine_with_retired_names() -> Engine {
        let mut doc = Registry::builtin().unwrap().to_doc();
        doc.deprecated.insert("daemon_stop".into(), Some("stop".into()));
        doc.deprecated.insert("wallet_unlock_all".into(), None);
        Engine::new(Registry::from_doc(doc).unwrap(), Config::default())
    }

    #[test]
    fn test_deprecated_name_redirects() {
        let engine = engine_with_retired_names();
        let call = engine.bind_rpc("daemon_stop", &json!({})).unwrap();
        assert_eq!(call.command.key(), "stop");
        let call = engine.bind_cli(&["daemon_stop"]).unwrap();
        assert_eq!(call.command.key(), "stop");
    }

    #[test]
    fn test_builtin_retires_daemon_stop() {
        let call = engine().bind_cli(&["daemon_stop"]).unwrap();
        assert_eq!(call.command.key(), "stop");
    }

    #[test]
    fn test_permanently_deprecated_name() {
        let engine = engine_with_retired_names();
        let err = engine.bind_rpc("wallet_unlock_all", &json!({})).unwrap_err();
        assert_eq!(err, Error::Deprecated("wallet_unlock_all".into()));
        let err = engine.bind_cli(&["wallet_unlock_all"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeprecatedCommand);
    }

    #[test]
    fn test_redirected_call_still_binds_arguments() {
        let err = engine_with_retired_names()
            .bind_cli(&["daemon_stop", "--colour=red"])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownArgument);
    }

    #[test]
    fn test_paginated_call_gets_defaults() {
        let call = engine().bind_rpc("account_list", &json!({})).unwrap();
        let request = call.pagination.unwrap();
        assert_eq!(request.page.get(), 1);
        assert_eq!(request.page_size.get(), 20);
        assert_eq!(call.params.get("page"), Some(&ParamValue::Int(1)));
        assert_eq!(call.params.get("include_total"), Some(&ParamValue::Bool(false)));
    }

    #[test]
    fn test_configured_page_size_applies() {
        let mut config = Config::default();
        config.pagination.default_page_size = 7;
        let engine = Engine::new(Registry::builtin().unwrap(), config);
        let call = engine.bind_cli(&["txo", "list"]).unwrap();
        assert_eq!(call.pagination.unwrap().page_size.get(), 7);
    }

    #[test]
    fn test_page_size_zero_rejected() {
        let err = engine()
            .bind_rpc("claim_search", &json!({"page_size": 0}))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Binding(BindingError::PaginationRange {
                argument: "page_size".into(),
                received: 0,
            })
        );
    }

    #[test]
    fn test_bad_params_shape() {
        let err = engine().bind_rpc("stop", &json!("x")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
    }
}
