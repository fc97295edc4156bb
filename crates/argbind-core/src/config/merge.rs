//! Configuration merging logic
//!
//! Later layers override earlier ones (defaults → global → project → env → CLI).
//! A key the overriding layer does not set keeps the earlier value.

use super::types::{Config, ConfigLayer, OutputConfig, OutputLayer, PaginationConfig};

impl Config {
    /// Merge a layer into this config (the layer's keys take precedence)
    #[must_use]
    pub fn merge(self, layer: ConfigLayer) -> Self {
        Self {
            schema_path: layer.schema_path.or(self.schema_path),
            pagination: PaginationConfig {
                default_page_size: layer
                    .pagination
                    .default_page_size
                    .unwrap_or(self.pagination.default_page_size),
            },
            output: OutputConfig {
                json: layer.output.json.unwrap_or(self.output.json),
                pretty: layer.output.pretty.unwrap_or(self.output.pretty),
            },
        }
    }

    /// Apply command-line switches. Flags can only turn output modes on.
    #[must_use]
    pub fn with_cli_flags(self, json: bool, pretty: bool) -> Self {
        self.merge(ConfigLayer {
            output: OutputLayer {
                json: json.then_some(true),
                pretty: pretty.then_some(true),
            },
            ..ConfigLayer::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::types::PaginationLayer;

    #[test]
    fn test_project_overrides_global() {
        let global = ConfigLayer {
            schema_path: Some(PathBuf::from("global.json")),
            pagination: PaginationLayer {
                default_page_size: Some(50),
            },
            ..ConfigLayer::default()
        };
        let project = ConfigLayer {
            schema_path: Some(PathBuf::from("project.json")),
            ..ConfigLayer::default()
        };
        let merged = Config::default().merge(global).merge(project);
        assert_eq!(merged.schema_path, Some(PathBuf::from("project.json")));
        assert_eq!(merged.pagination.default_page_size, 50);
    }

    #[test]
    fn test_later_layer_can_restore_defaults() {
        let global = ConfigLayer {
            pagination: PaginationLayer {
                default_page_size: Some(50),
            },
            output: OutputLayer {
                json: Some(true),
                pretty: None,
            },
            ..ConfigLayer::default()
        };
        let project = ConfigLayer {
            pagination: PaginationLayer {
                default_page_size: Some(20),
            },
            output: OutputLayer {
                json: Some(false),
                pretty: None,
            },
            ..ConfigLayer::default()
        };
        let merged = Config::default().merge(global).merge(project);
        assert_eq!(merged.pagination.default_page_size, 20);
        assert!(!merged.output.json);
    }

    #[test]
    fn test_cli_flags_turn_output_on() {
        let config = Config::default().with_cli_flags(true, false);
        assert!(config.output.json);
        assert!(!config.output.pretty);
        let kept = config.with_cli_flags(false, true);
        assert!(kept.output.json);
        assert!(kept.output.pretty);
    }
}
