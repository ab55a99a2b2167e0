//! Comparison settings loaded from a TOML file.
//!
//! ```toml
//! format = "long"
//! max_diffs = 20
//! reject_paths = ["/meta/generated_at", "/meta/host"]
//! match_by_key = ["/items/:id"]
//! indifferent_values = true
//! ```
//!
//! Every flag value goes through [`FlagsBuilder::set`], so a file is coerced
//! and validated exactly like the command line.

use crate::error::ConfigError;
use crate::flags::{FlagValue, FlagsBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagsFile {
    /// Output format name, checked by the caller
    pub format: Option<String>,
    pub max_diffs: Option<FlagValue>,
    pub fail_fast: Option<FlagValue>,
    pub max_depth: Option<FlagValue>,
    pub select_paths: Option<FlagValue>,
    pub reject_paths: Option<FlagValue>,
    pub match_by_key: Option<FlagValue>,
    pub match_by_value: Option<FlagValue>,
    pub indifferent_keys: Option<FlagValue>,
    pub indifferent_values: Option<FlagValue>,
}

impl FlagsFile {
    /// # Errors
    ///
    /// `ConfigError::ReadError` if the file cannot be read, and
    /// `ConfigError::TomlError` for bad syntax or unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let name = path.to_string_lossy().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: name.clone(),
            source,
        })?;
        let file = Self::parse(&content, &name)?;
        tracing::debug!(path = %name, "loaded config file");
        Ok(file)
    }

    pub fn parse(content: &str, name: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlError {
            path: name.to_string(),
            source,
        })
    }

    /// Feeds every value present in the file into `builder`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Flag` if a value is rejected by the builder.
    pub fn apply(self, builder: FlagsBuilder) -> Result<FlagsBuilder, ConfigError> {
        let entries = [
            ("max_diffs", self.max_diffs),
            ("fail_fast", self.fail_fast),
            ("max_depth", self.max_depth),
            ("select_paths", self.select_paths),
            ("reject_paths", self.reject_paths),
            ("match_by_key", self.match_by_key),
            ("match_by_value", self.match_by_value),
            ("indifferent_keys", self.indifferent_keys),
            ("indifferent_values", self.indifferent_values),
        ];

        let mut builder = builder;
        for (name, value) in entries {
            if let Some(value) = value {
                builder = builder.set(name, value)?;
            }
        }
        Ok(builder)
    }
}
