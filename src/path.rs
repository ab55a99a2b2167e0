//! Canonical node addresses and the pattern tests built on them.
//!
//! A [`Path`] is an immutable sequence of [`PathSegment`]s. Its canonical form
//! is `/` followed by the segments joined with `/`; the root path is `/` and
//! has depth 1.
//!
//! The same type serves both as the address of a node during a comparison
//! and as a pattern supplied through [`Flags`] (select/reject lists, key and
//! value matching, normalizers).
//!
//! # Examples
//!
//! ```
//! use refcheck::path::Path;
//!
//! let path: Path = "/foo/id=42/bar".parse().unwrap();
//! assert_eq!(path.depth(), 4);
//! assert!(path.matches(&"/foo/:id/bar".parse().unwrap()));
//! assert!(path.matches(&"/*/*/bar".parse().unwrap()));
//! assert!(!path.matches(&"/foo/:name/bar".parse().unwrap()));
//! ```

use crate::error::{CompareError, PathError};
use crate::flags::Flags;
use crate::segment::PathSegment;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<PathSegment>,
    repr: String,
}

impl Path {
    pub fn root() -> Self {
        Self::from_segments(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let mut repr = String::from(SEPARATOR);
        let names: Vec<String> = segments.iter().map(ToString::to_string).collect();
        repr.push_str(&names.join("/"));
        Self { segments, repr }
    }

    /// Parses a `/`-separated path.
    ///
    /// The leading separator is optional and blank leading names are skipped,
    /// so `""`, `"/"` and `"foo"` parse as `/`, `/` and `/foo`. A trailing
    /// separator is ignored.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidPath` for empty interior segments
    /// (`/foo//bar`) or any segment that fails [`PathSegment::parse`].
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let mut names: Vec<&str> = s.split(SEPARATOR).collect();
        let first = names
            .iter()
            .position(|name| !name.trim().is_empty())
            .unwrap_or(names.len());
        names.drain(..first);
        while names.last().is_some_and(|name| name.is_empty()) {
            names.pop();
        }

        let segments = names
            .into_iter()
            .map(|name| {
                if name.is_empty() {
                    Err(PathError::invalid_path(s, "paths cannot contain empty segments"))
                } else {
                    PathSegment::parse(name).map_err(|e| PathError::invalid_path(s, e.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_segments(segments))
    }

    /// Returns a new path with one more segment; `self` is untouched.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidPathSegment` if `name` is not a valid token.
    pub fn join(&self, name: &str) -> Result<Path, PathError> {
        let segment = PathSegment::parse(name)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self::from_segments(segments))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.repr
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        1 + self.segments.len()
    }

    pub fn basename(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// `None` for the root path.
    pub fn parent(&self) -> Option<Path> {
        if self.is_root() {
            return None;
        }
        Some(Self::from_segments(
            self.segments[..self.segments.len() - 1].to_vec(),
        ))
    }

    /// Every strict prefix of this path, root first.
    pub fn ancestors(&self) -> Vec<Path> {
        (0..self.segments.len())
            .map(|len| Self::from_segments(self.segments[..len].to_vec()))
            .collect()
    }

    /// Pattern test: equal canonical strings, or the same number of segments
    /// with every pair matching per [`PathSegment::matches`].
    pub fn matches(&self, other: &Path) -> bool {
        if self == other {
            return true;
        }
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.matches(b))
    }

    /// Whether the comparison should skip this node (and so its subtree).
    ///
    /// The root is never excluded. Otherwise a node is excluded when it is
    /// deeper than `max_depth`, when it or an ancestor matches a reject
    /// pattern, or when select patterns exist and neither it nor any ancestor
    /// matches one.
    pub fn is_excluded(&self, flags: &Flags) -> bool {
        if self.is_root() {
            return false;
        }

        if flags.max_depth().is_some_and(|max| self.depth() > max) {
            return true;
        }

        if !flags.reject_paths().is_empty() && self.on_or_under(flags.reject_paths()) {
            return true;
        }

        if !flags.select_paths().is_empty() && !self.on_or_under(flags.select_paths()) {
            return true;
        }

        false
    }

    /// Resolves the key name to use when the array at this path is compared
    /// by key.
    ///
    /// A key pattern such as `/items/:id` applies to the array at `/items`,
    /// so patterns are tested by their parent.
    ///
    /// # Errors
    ///
    /// Returns `CompareError::AmbiguousKey` when more than one distinct
    /// pattern applies to this path, even if they name the same key.
    pub fn key_for_compare(&self, flags: &Flags) -> Result<Option<String>, CompareError> {
        let matching: Vec<&Path> = flags
            .key_patterns()
            .iter()
            .filter(|expr| expr.parent().is_some_and(|parent| parent.matches(self)))
            .collect();

        match matching.as_slice() {
            [] => Ok(None),
            [expr] => Ok(expr
                .basename()
                .and_then(PathSegment::key)
                .map(ToString::to_string)),
            _ => Err(CompareError::AmbiguousKey {
                path: self.to_string(),
                patterns: matching.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// The key expressions embedded in this pattern, shortest first.
    ///
    /// `/foo/:id/bar/:name` yields `/foo/:id` and `/foo/:id/bar/:name`.
    pub(crate) fn key_exprs(&self) -> Vec<Path> {
        self.ancestors()
            .into_iter()
            .chain(std::iter::once(self.clone()))
            .filter(|path| path.basename().is_some_and(PathSegment::is_key_expr))
            .collect()
    }

    fn on_or_under(&self, patterns: &[Path]) -> bool {
        let ancestors = self.ancestors();
        patterns.iter().any(|pattern| {
            pattern.matches(self) || ancestors.iter().any(|ancestor| pattern.matches(ancestor))
        })
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.repr.hash(state);
    }
}

impl PartialEq<str> for Path {
    fn eq(&self, other: &str) -> bool {
        self.repr == other
    }
}

impl PartialEq<&str> for Path {
    fn eq(&self, other: &&str) -> bool {
        self.repr == *other
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Path::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_root() {
        let root = Path::root();
        assert_eq!(root.to_string(), "/");
        assert_eq!(root.depth(), 1);
        assert!(root.is_root());
        assert_eq!(path(""), root);
        assert_eq!(path("/"), root);
    }

    #[test]
    fn test_parse_normalizes_leading_and_trailing_separators() {
        assert_eq!(path("foo").to_string(), "/foo");
        assert_eq!(path("/foo/").to_string(), "/foo");
        assert_eq!(path("  /foo/bar").to_string(), "/foo/bar");
    }

    #[test]
    fn test_parse_rejects_empty_interior_segment() {
        assert!(matches!(
            Path::parse("/foo//bar"),
            Err(PathError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_join_leaves_original_untouched() {
        let foo = path("/foo");
        let bar = foo.join("bar").unwrap();
        assert_eq!(foo.to_string(), "/foo");
        assert_eq!(bar.to_string(), "/foo/bar");
    }

    #[test]
    fn test_join_rejects_whitespace() {
        assert!(matches!(
            Path::root().join("hello world"),
            Err(PathError::InvalidPathSegment { .. })
        ));
    }

    #[test]
    fn test_key_exprs() {
        let exprs: Vec<String> = path("/foo/:id/bar/:name")
            .key_exprs()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(exprs, vec!["/foo/:id", "/foo/:id/bar/:name"]);
        assert!(path("/foo/bar").key_exprs().is_empty());
    }

    #[test]
    fn test_equality_is_literal() {
        assert_ne!(path("/foo/id=42"), path("/foo/:id"));
        assert_eq!(path("/foo/id=42"), "/foo/id=42");
    }
}
