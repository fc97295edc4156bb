//! Configuration loading from files and environment
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use super::types::{Config, ConfigLayer};
use crate::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML
/// - An `ARGBIND_*` variable holds an unparsable value
/// - Config values fail validation
pub fn load_config() -> Result<Config> {
    let project = project_config_path()?;
    load_layers(global_config_path().as_deref(), &project)
}

/// Load defaults, then the given global and project files if they exist,
/// then environment overrides.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_layers(global: Option<&Path>, project: &Path) -> Result<Config> {
    let config = Config::default();

    let config = match global {
        Some(path) if path.exists() => config.merge(load_toml_file(path)?),
        _ => config,
    };

    let config = if project.exists() {
        config.merge(load_toml_file(project)?)
    } else {
        config
    };

    let config = config.apply_env_vars()?;
    config.validate()?;

    tracing::debug!(
        schema_path = ?config.schema_path,
        default_page_size = config.pagination.default_page_size,
        "configuration loaded"
    );
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "argbind")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(".argbind/config.toml"))
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file as a layer holding only the keys it sets
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<ConfigLayer> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}\n\
             \n\
             Expected: .argbind/config.toml (file)",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            Error::io_error(format!(
                "Permission denied reading config file {}: {e}\n\
                 \n\
                 Check file permissions: ls -l {}",
                path.display(),
                path.display()
            ))
        } else {
            Error::io_error(format!("Failed to read config file {}: {e}", path.display()))
        }
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::invalid_config(format!(
            "Failed to parse config file {}: {e}\n\
             \n\
             The config file contains invalid TOML syntax or an unknown value type.",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var("ARGBIND_SCHEMA_PATH") {
            if value.is_empty() {
                return Err(Error::invalid_config(
                    "ARGBIND_SCHEMA_PATH cannot be empty - unset the variable or provide a path",
                ));
            }
            self.schema_path = Some(PathBuf::from(value));
        }

        if let Ok(value) = std::env::var("ARGBIND_DEFAULT_PAGE_SIZE") {
            self.pagination.default_page_size = value.parse().map_err(|e| {
                Error::invalid_config(format!("Invalid ARGBIND_DEFAULT_PAGE_SIZE value: {e}"))
            })?;
        }

        if let Ok(value) = std::env::var("ARGBIND_OUTPUT_JSON") {
            self.output.json = value.parse().map_err(|e| {
                Error::invalid_config(format!("Invalid ARGBIND_OUTPUT_JSON value: {e}"))
            })?;
        }

        if let Ok(value) = std::env::var("ARGBIND_OUTPUT_PRETTY") {
            self.output.pretty = value.parse().map_err(|e| {
                Error::invalid_config(format!("Invalid ARGBIND_OUTPUT_PRETTY value: {e}"))
            })?;
        }

        Ok(self)
    }
}
