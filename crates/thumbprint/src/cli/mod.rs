//! Command implementations.

pub mod classify;
pub mod config;
pub mod hash;
pub mod thumb;
pub mod types;

use std::path::{Path, PathBuf};
use thumbprint_core::{Config, ConfigError};

/// Load the config from `path` if given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Resolve the config file location, expanding a leading `~`.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => {
            let path_str = path.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        }
        None => Config::default_path(),
    }
}
