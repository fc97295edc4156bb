//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/argbind/config.toml
//! 3. Project config: .argbind/config.toml
//! 4. Environment variables: ARGBIND_*
//! 5. CLI flags (`--json`, `--pretty`)
//!
//! # Example Config
//!
//! ```toml
//! schema_path = "schema/interface.json"
//!
//! [pagination]
//! default_page_size = 50
//!
//! [output]
//! json = true
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Configuration merging logic
//! - `validate`: Validation

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
mod tests_loading;

pub use load::{global_config_path, load_config, load_layers, load_toml_file, project_config_path};
pub use types::{
    Config, ConfigLayer, OutputConfig, OutputLayer, PaginationConfig, PaginationLayer,
};
