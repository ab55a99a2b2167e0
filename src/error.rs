//! Custom error types for refcheck.
//!
//! Structural disagreements between two documents are never errors: they are
//! recorded as [`crate::diff::Diff`]s. The types here cover the fatal cases
//! that abort a comparison outright.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("{segment:?} is not a valid path segment: {reason}")]
    InvalidPathSegment { segment: String, reason: String },

    #[error("{path:?} is not a valid path: {reason}")]
    InvalidPath { path: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("{value} is not a legal value for {flag}")]
    InvalidFlag { flag: &'static str, value: String },

    #[error("select_paths and reject_paths cannot both be set")]
    Conflict,

    #[error("Unrecognized flag: {name}")]
    UnknownFlag { name: String },

    #[error("Invalid pattern for {flag}: {source}")]
    InvalidPattern {
        flag: &'static str,
        #[source]
        source: PathError,
    },
}

/// Which of the two compared documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reference,
    Candidate,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reference => f.write_str("reference"),
            Side::Candidate => f.write_str("candidate"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("The element at position {position} in the {side} array is not an object (found {found})")]
    TypeMismatch {
        side: Side,
        position: usize,
        found: &'static str,
    },

    #[error("The {side} object at position {position} has no {key:?} key (keys: {keys:?})")]
    NoSuchKey {
        side: Side,
        position: usize,
        key: String,
        keys: Vec<String>,
    },

    #[error("Duplicate {side} element found at path '{path}'")]
    DuplicateKey { side: Side, path: String },

    #[error("Comparing arrays by value is only defined for scalar elements (array at '{path}')")]
    BehaviorUndefined { path: String },

    #[error("More than one match_by_key expression for path '{path}': {patterns:?}")]
    AmbiguousKey { path: String, patterns: Vec<String> },

    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug, thiserror::Error)]
pub enum DiffsError {
    #[error("No diff recorded at path '{path}'")]
    NotFound { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Flag(#[from] FlagError),
}

#[derive(Debug, thiserror::Error)]
pub enum RefcheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ParseError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn json_error(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }

    pub fn yaml_error(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlError {
            path: path.into(),
            source,
        }
    }

    pub fn toml_error(path: impl Into<String>, source: toml::de::Error) -> Self {
        Self::TomlError {
            path: path.into(),
            source,
        }
    }
}

impl PathError {
    pub fn invalid_segment(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPathSegment {
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl FlagError {
    pub fn invalid(flag: &'static str, value: impl fmt::Display) -> Self {
        Self::InvalidFlag {
            flag,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::file_not_found("test.json");
        assert_eq!(err.to_string(), "File not found: test.json");
    }

    #[test]
    fn test_output_error_display() {
        let err = OutputError::UnknownFormat {
            format: "xml".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown output format: xml");
    }

    #[test]
    fn test_invalid_flag_names_value() {
        let err = FlagError::invalid("max_diffs", "0");
        assert_eq!(err.to_string(), "0 is not a legal value for max_diffs");
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Reference.to_string(), "reference");
        assert_eq!(Side::Candidate.to_string(), "candidate");
    }

    #[test]
    fn test_no_such_key_lists_keys() {
        let err = CompareError::NoSuchKey {
            side: Side::Reference,
            position: 0,
            key: "identifier".to_string(),
            keys: vec!["id".to_string(), "foo".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("The reference object at position 0 has no \"identifier\" key"));
        assert!(msg.contains("\"foo\""));
    }

    #[test]
    fn test_refcheck_error_from_compare_error() {
        let err: RefcheckError = CompareError::DuplicateKey {
            side: Side::Candidate,
            path: "/id=1".to_string(),
        }
        .into();
        assert!(matches!(err, RefcheckError::Compare(_)));
        assert!(err.to_string().contains("Duplicate candidate element"));
    }
}
