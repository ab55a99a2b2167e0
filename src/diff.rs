//! Recorded differences.
//!
//! A [`Diff`] is one structural disagreement between the reference and the
//! candidate. [`Diffs`] keeps them in the order they were recorded and also
//! indexes them by path. It enforces the recording limit derived from
//! `fail_fast`/`max_diffs`: once the limit is reached, [`Diffs::record`]
//! refuses the diff and returns [`CutoffReached`] so the comparison can stop.

use crate::error::DiffsError;
use crate::flags::Flags;
use crate::path::Path;
use crate::tree::Node;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// The kind of difference found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Present in the reference, absent from the candidate
    Missing,
    /// Present in the candidate, absent from the reference
    Extra,
    /// Both present, scalar values differ
    Mismatch,
    /// Both present, one is an array/object and the other is not (or a different one)
    TypeMismatch,
}

impl DiffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffKind::Missing => "missing",
            DiffKind::Extra => "extra",
            DiffKind::Mismatch => "mismatch",
            DiffKind::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single difference.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub kind: DiffKind,
    /// Canonical path string, always starting with `/`
    pub path: String,
    /// Reference value (None for Extra)
    pub reference: Option<Node>,
    /// Candidate value (None for Missing)
    pub candidate: Option<Node>,
}

/// Signal that the recording limit was hit and the comparison must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffReached;

/// Ordered collection of diffs with lookup by path.
#[derive(Debug, Clone, Default)]
pub struct Diffs {
    list: Vec<Diff>,
    by_path: HashMap<String, usize>,
    limit: Option<usize>,
}

impl Diffs {
    /// An empty collection with no recording limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty collection that honors the cutoff configured in `flags`.
    pub fn for_flags(flags: &Flags) -> Self {
        Self {
            limit: flags.cutoff(),
            ..Self::default()
        }
    }

    /// Records a diff.
    ///
    /// # Errors
    ///
    /// Returns `CutoffReached` without recording anything when the
    /// collection already holds as many diffs as the limit allows.
    pub fn record(
        &mut self,
        kind: DiffKind,
        path: &Path,
        reference: Option<&Node>,
        candidate: Option<&Node>,
    ) -> Result<(), CutoffReached> {
        self.push(Diff {
            kind,
            path: path.to_string(),
            reference: reference.cloned(),
            candidate: candidate.cloned(),
        })
    }

    /// Appends an already-built diff, subject to the same limit as [`Diffs::record`].
    pub fn push(&mut self, diff: Diff) -> Result<(), CutoffReached> {
        if self.limit.is_some_and(|limit| self.list.len() >= limit) {
            return Err(CutoffReached);
        }
        // Later diffs at the same path shadow earlier ones in path lookups.
        self.by_path.insert(diff.path.clone(), self.list.len());
        self.list.push(diff);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Diff> {
        self.list.get(index)
    }

    /// The most recent diff recorded at exactly `path`.
    ///
    /// # Errors
    ///
    /// Returns `DiffsError::NotFound` when nothing was recorded there.
    pub fn at_path(&self, path: &str) -> Result<&Diff, DiffsError> {
        self.by_path
            .get(path)
            .map(|&i| &self.list[i])
            .ok_or_else(|| DiffsError::NotFound {
                path: path.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diff> {
        self.list.iter()
    }

    /// Number of diffs of the given kind.
    pub fn count(&self, kind: DiffKind) -> usize {
        self.list.iter().filter(|d| d.kind == kind).count()
    }

    pub fn as_slice(&self) -> &[Diff] {
        &self.list
    }

    pub fn into_vec(self) -> Vec<Diff> {
        self.list
    }
}

impl Index<usize> for Diffs {
    type Output = Diff;

    fn index(&self, index: usize) -> &Diff {
        &self.list[index]
    }
}

impl Index<&str> for Diffs {
    type Output = Diff;

    /// # Panics
    ///
    /// Panics if no diff was recorded at `path`; use [`Diffs::at_path`] to
    /// handle that case.
    fn index(&self, path: &str) -> &Diff {
        match self.at_path(path) {
            Ok(diff) => diff,
            Err(err) => panic!("{}", err),
        }
    }
}

impl<'a> IntoIterator for &'a Diffs {
    type Item = &'a Diff;
    type IntoIter = std::slice::Iter<'a, Diff>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl IntoIterator for Diffs {
    type Item = Diff;
    type IntoIter = std::vec::IntoIter<Diff>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_lookup_by_index_and_path() {
        let mut diffs = Diffs::new();
        diffs
            .record(DiffKind::Missing, &path("/foo"), Some(&Node::from(42_i64)), None)
            .unwrap();
        diffs
            .record(DiffKind::Extra, &path("/bar"), None, Some(&Node::from(23_i64)))
            .unwrap();

        assert_eq!(diffs[0].path, "/foo");
        assert_eq!(diffs[1].path, "/bar");
        assert_eq!(diffs["/bar"].kind, DiffKind::Extra);
        assert_eq!(diffs.at_path("/foo").unwrap().kind, DiffKind::Missing);
        assert!(matches!(
            diffs.at_path("/nope"),
            Err(DiffsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_last_write_wins_for_path_lookup() {
        let mut diffs = Diffs::new();
        diffs
            .record(DiffKind::Missing, &path("/2"), Some(&Node::from(1_i64)), None)
            .unwrap();
        diffs
            .record(DiffKind::Extra, &path("/2"), None, Some(&Node::from(3_i64)))
            .unwrap();

        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs["/2"].kind, DiffKind::Extra);
    }

    #[test]
    fn test_limit_refuses_excess_diff() {
        let flags = Flags::builder().max_diffs(2).build().unwrap();
        let mut diffs = Diffs::for_flags(&flags);
        let p = path("/x");

        assert!(diffs.record(DiffKind::Mismatch, &p, None, None).is_ok());
        assert!(diffs.record(DiffKind::Mismatch, &p, None, None).is_ok());
        assert_eq!(
            diffs.record(DiffKind::Mismatch, &p, None, None),
            Err(CutoffReached)
        );
        assert_eq!(diffs.len(), 2);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DiffKind::TypeMismatch.to_string(), "type_mismatch");
        assert_eq!(DiffKind::Missing.as_str(), "missing");
    }
}
