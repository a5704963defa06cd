//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::pipeline::hash::HashSpec;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        HashSpec::new(self.hash.resolution)?;

        if self.thumbnail.quality == 0 || self.thumbnail.quality > 100 {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 1 and 100".into(),
            ));
        }
        if self.transcoder.program.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "transcoder.program must not be empty".into(),
            ));
        }
        if self.transcoder.default_scale == 0 {
            return Err(ConfigError::ValidationError(
                "transcoder.default_scale must be > 0".into(),
            ));
        }
        Ok(())
    }
}
