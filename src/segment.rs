//! Single path segments and the rules for matching one against another.
//!
//! # Segment Syntax
//!
//! - `foo`, `3` - a plain segment: an object key or 1-based array position
//! - `:id` - a key expression, only meaningful in patterns
//! - `id=42` - a key/value segment, produced by key-matched array comparison
//! - `*` - a wildcard matching any single segment
//!
//! # Examples
//!
//! ```
//! use refcheck::segment::PathSegment;
//!
//! let expr: PathSegment = ":id".parse().unwrap();
//! let concrete: PathSegment = "id=42".parse().unwrap();
//! assert!(expr.matches(&concrete));
//! assert!(!expr.matches(&expr));
//! ```

use crate::error::PathError;
use std::fmt;
use std::str::FromStr;

/// One token of a [`crate::path::Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A literal name
    Plain(String),
    /// `:key`
    KeyExpr(String),
    /// `key=value`
    KeyValue { key: String, value: String },
    /// `*`
    Wildcard,
}

impl PathSegment {
    /// Parses and classifies a token.
    ///
    /// Leading and trailing whitespace is ignored. Classification is tried in
    /// this order: wildcard, key expression, key/value, plain.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidPathSegment` if the token is blank, has
    /// interior whitespace, or is a malformed key expression (`:`, `:a:b`).
    pub fn parse(token: &str) -> Result<Self, PathError> {
        let name = token.trim();
        if name.is_empty() {
            return Err(PathError::invalid_segment(token, "segment is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(PathError::invalid_segment(token, "segment contains whitespace"));
        }

        if name == "*" {
            return Ok(PathSegment::Wildcard);
        }

        if let Some(key) = name.strip_prefix(':') {
            if key.is_empty() || key.contains(':') {
                return Err(PathError::invalid_segment(
                    token,
                    "a key expression is a single ':' followed by a key name",
                ));
            }
            return Ok(PathSegment::KeyExpr(key.to_string()));
        }

        if let Some((key, value)) = name.split_once('=') {
            if !key.is_empty() && !value.is_empty() && !value.contains('=') {
                return Ok(PathSegment::KeyValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(PathSegment::Plain(name.to_string()))
    }

    /// The key named by a key expression or key/value segment.
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSegment::KeyExpr(key) | PathSegment::KeyValue { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn is_key_expr(&self) -> bool {
        matches!(self, PathSegment::KeyExpr(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, PathSegment::Wildcard)
    }

    /// Pairwise segment match. Symmetric.
    ///
    /// A wildcard on either side matches anything; plain segments match on
    /// equal names; a key expression matches a key/value segment with the same
    /// key. Two key expressions never match each other, nor do two key/value
    /// segments (literal equality of whole paths is handled by `Path`).
    pub fn matches(&self, other: &PathSegment) -> bool {
        use PathSegment::*;

        match (self, other) {
            (Wildcard, _) | (_, Wildcard) => true,
            (Plain(a), Plain(b)) => a == b,
            (KeyExpr(a), KeyValue { key: b, .. }) | (KeyValue { key: b, .. }, KeyExpr(a)) => {
                a == b
            }
            _ => false,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Plain(name) => f.write_str(name),
            PathSegment::KeyExpr(key) => write!(f, ":{}", key),
            PathSegment::KeyValue { key, value } => write!(f, "{}={}", key, value),
            PathSegment::Wildcard => f.write_str("*"),
        }
    }
}

impl FromStr for PathSegment {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathSegment::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(s: &str) -> PathSegment {
        PathSegment::parse(s).unwrap()
    }

    #[test]
    fn test_classification() {
        assert_eq!(seg("foo"), PathSegment::Plain("foo".to_string()));
        assert_eq!(seg(":foo"), PathSegment::KeyExpr("foo".to_string()));
        assert_eq!(
            seg("foo=42"),
            PathSegment::KeyValue {
                key: "foo".to_string(),
                value: "42".to_string()
            }
        );
        assert_eq!(seg("*"), PathSegment::Wildcard);
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(seg("   foo "), PathSegment::Plain("foo".to_string()));
    }

    #[test]
    fn test_rejects_blank_and_interior_whitespace() {
        assert!(PathSegment::parse("").is_err());
        assert!(PathSegment::parse(" ").is_err());
        assert!(PathSegment::parse("hey bob").is_err());
    }

    #[test]
    fn test_rejects_ambiguous_key_expressions() {
        assert!(PathSegment::parse(":").is_err());
        assert!(PathSegment::parse(":a:b").is_err());
    }

    #[test]
    fn test_odd_equals_signs_are_plain() {
        assert_eq!(seg("=x"), PathSegment::Plain("=x".to_string()));
        assert_eq!(seg("x="), PathSegment::Plain("x=".to_string()));
        assert_eq!(seg("a=b=c"), PathSegment::Plain("a=b=c".to_string()));
    }

    #[test]
    fn test_interior_colon_is_plain() {
        assert_eq!(seg("12:30"), PathSegment::Plain("12:30".to_string()));
    }

    #[test]
    fn test_display_round_trips() {
        for token in ["foo", ":id", "id=42", "*"] {
            assert_eq!(seg(token).to_string(), token);
        }
    }

    #[test]
    fn test_key_accessor() {
        assert_eq!(seg(":id").key(), Some("id"));
        assert_eq!(seg("id=42").key(), Some("id"));
        assert_eq!(seg("id").key(), None);
    }
}
