//! Default configuration values

use super::types::PaginationConfig;

pub(super) const DEFAULT_PAGE_SIZE: u32 = crate::pagination::DEFAULT_PAGE_SIZE.get();

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schema_path, None);
        assert_eq!(config.pagination.default_page_size, 20);
        assert!(!config.output.json);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let parsed: Result<Config, _> = toml::from_str("");
        assert_eq!(parsed.ok(), Some(Config::default()));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let parsed: Result<Config, _> = toml::from_str("[output]\njson = true\n");
        let config = parsed.unwrap_or_default();
        assert!(config.output.json);
        assert_eq!(config.pagination.default_page_size, DEFAULT_PAGE_SIZE);
    }
}
