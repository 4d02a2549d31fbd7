//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The configuration file holds defaults for command generation, so that
//! dumps produced by `seedline run --emit` look the same on every machine
//! that shares the file.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! An explicit `--config <path>` must exist. Otherwise, searched in order:
//! 1. `$SEEDLINE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/seedline/config.toml`
//! 3. `~/.seedline/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use seedline::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Positional: {}", config.positional());
//! println!("Skip defaults: {}", config.skip_defaults());
//! ```

pub mod schema;

pub use schema::{ConfigFile, GenerateDefaults};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Loaded configuration.
///
/// Accessor methods apply defaults for anything the file leaves unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: ConfigFile,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit`, that file must exist and parse. Without it, the
    /// standard locations are searched and missing files mean defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::search(),
        };

        match path {
            Some(path) => Ok(Config {
                file: Self::read_config(&path)?,
                path: Some(path),
            }),
            None => Ok(Config::default()),
        }
    }

    /// Find the first existing config file in the standard locations.
    fn search() -> Option<PathBuf> {
        // 1. Check $SEEDLINE_CONFIG
        if let Ok(path) = std::env::var("SEEDLINE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/seedline/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("seedline/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.seedline/config.toml
        dirs::home_dir()
            .map(|home| home.join(".seedline/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Whether generated commands use the first alias of types and fields.
    ///
    /// Defaults to `false` if not configured.
    pub fn prefer_aliases(&self) -> bool {
        self.generate().and_then(|g| g.prefer_aliases).unwrap_or(false)
    }

    /// Whether generated commands bind positional fields by position.
    ///
    /// Defaults to `true` if not configured.
    pub fn positional(&self) -> bool {
        self.generate().and_then(|g| g.positional).unwrap_or(true)
    }

    /// Whether generated commands leave out default-valued fields.
    ///
    /// Defaults to `true` if not configured.
    pub fn skip_defaults(&self) -> bool {
        self.generate().and_then(|g| g.skip_defaults).unwrap_or(true)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn generate(&self) -> Option<&GenerateDefaults> {
        self.file.generate.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();

        assert!(!config.prefer_aliases());
        assert!(config.positional());
        assert!(config.skip_defaults());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("seedline.toml");

        fs::write(
            &config_path,
            r#"
            [generate]
            prefer_aliases = true
            positional = false
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();

        assert!(config.prefer_aliases());
        assert!(!config.positional());
        // Unset values keep their defaults
        assert!(config.skip_defaults());
        assert_eq!(config.loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("seedline.toml");

        fs::write(
            &config_path,
            r#"
            [generate]
            positional = true
            unknown_field = true
            "#,
        )
        .unwrap();

        let result = Config::load(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
