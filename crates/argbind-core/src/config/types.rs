//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars → CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Artifact to load instead of the built-in schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
    pub pagination: PaginationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Used when a paginated command's `page_size` has no default of its own.
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit results and errors as JSON envelopes.
    pub json: bool,
    /// Indent JSON output.
    pub pretty: bool,
}

/// One config file as written: `None` for every key the file leaves out.
///
/// Merging a layer only touches the keys it sets, so a project file can put
/// a value back to its default after the global file changed it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigLayer {
    pub schema_path: Option<PathBuf>,
    pub pagination: PaginationLayer,
    pub output: OutputLayer,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationLayer {
    pub default_page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputLayer {
    pub json: Option<bool>,
    pub pretty: Option<bool>,
}
