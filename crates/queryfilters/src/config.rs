//! # Configuration
//!
//! Decoding behavior is configured through [`FilterConfig`], loaded with
//! [`confique`] from an optional TOML file plus environment overrides.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `decode_mode` | `QUERYFILTERS_DECODE_MODE` | `lenient` | `lenient` or `typed` |
//! | `strict_numbers` | `QUERYFILTERS_STRICT_NUMBERS` | `false` | Reject `"3abc"` as a number |
//!
//! The defaults reproduce the decoding existing URLs were written for.
//! `typed` stops string filters from turning `"true"`, `"null"` or `"42"`
//! into other kinds; `strict_numbers` turns off prefix parsing.

use std::path::Path;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::codec::{DecodeMode, DecodeOptions};
use crate::error::Result;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// How parameter text is decoded: "lenient" or "typed".
    #[config(default = "lenient", env = "QUERYFILTERS_DECODE_MODE")]
    pub decode_mode: DecodeMode,

    /// Only accept whole-text integers when decoding numbers.
    #[config(default = false, env = "QUERYFILTERS_STRICT_NUMBERS")]
    pub strict_numbers: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            decode_mode: DecodeMode::Lenient,
            strict_numbers: false,
        }
    }
}

impl FilterConfig {
    /// Load from a TOML file, with environment variables taking precedence.
    /// A missing file is not an error; defaults fill the gaps.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::builder().env().file(path.as_ref()).load()?;
        Ok(config)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            mode: self.decode_mode,
            strict_numbers: self.strict_numbers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert_eq!(config.decode_mode, DecodeMode::Lenient);
        assert!(!config.strict_numbers);
        assert_eq!(config.decode_options(), DecodeOptions::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.toml");
        fs::write(&path, "decode_mode = \"typed\"\nstrict_numbers = true\n").unwrap();

        let config = FilterConfig::from_file(&path).unwrap();
        assert_eq!(config.decode_mode, DecodeMode::Typed);
        assert!(config.strict_numbers);

        let options = config.decode_options();
        assert_eq!(options.mode, DecodeMode::Typed);
        assert!(options.strict_numbers);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = FilterConfig::from_file(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.decode_mode, DecodeMode::Lenient);
    }

    #[test]
    fn test_invalid_mode_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("filters.toml");
        fs::write(&path, "decode_mode = \"fuzzy\"\n").unwrap();

        assert!(matches!(
            FilterConfig::from_file(&path),
            Err(crate::error::FilterError::Config(_))
        ));
    }
}
