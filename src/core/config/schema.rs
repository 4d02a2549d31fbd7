//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! [generate]
//! prefer_aliases = false
//! positional = true
//! skip_defaults = true
//! ```

use serde::{Deserialize, Serialize};

/// Top-level config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Command generation defaults
    pub generate: Option<GenerateDefaults>,
}

/// Command generation defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateDefaults {
    /// Emit the first declared alias instead of canonical names
    pub prefer_aliases: Option<bool>,

    /// Emit positional fields as bare tokens
    pub positional: Option<bool>,

    /// Leave out fields holding their default value
    pub skip_defaults: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed, ConfigFile::default());
    }

    #[test]
    fn serializes_back_to_toml() {
        let file = ConfigFile {
            generate: Some(GenerateDefaults {
                skip_defaults: Some(false),
                ..Default::default()
            }),
        };
        let text = toml::to_string(&file).unwrap();
        let parsed: ConfigFile = toml::from_str(&text).unwrap();
        assert_eq!(parsed, file);
    }
}
