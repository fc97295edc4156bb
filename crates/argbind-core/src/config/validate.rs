//! Configuration validation

use std::num::NonZeroU32;

use super::types::Config;
use crate::{Error, Result};

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_page_size == 0 {
            return Err(Error::invalid_config(
                "pagination.default_page_size must be at least 1",
            ));
        }

        if let Some(path) = &self.schema_path {
            if !path.is_file() {
                return Err(Error::invalid_config(format!(
                    "schema_path does not name a file: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Page size applied when neither the caller nor the schema gives one.
    #[must_use]
    pub fn default_page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.pagination.default_page_size)
            .unwrap_or(crate::pagination::DEFAULT_PAGE_SIZE)
    }
}
