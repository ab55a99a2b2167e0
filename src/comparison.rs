//! Core comparison algorithm.
//!
//! [`perform`] walks the reference and candidate trees in step, recording a
//! [`crate::diff::Diff`] wherever they disagree. Every node is first tested
//! against the exclusion rules in [`Flags`]; an excluded node is skipped
//! together with its subtree.
//!
//! Arrays are compared in one of three ways, chosen per array path:
//!
//! - by key, when a `match_by_key` pattern applies: elements are objects
//!   paired up by the value of one attribute, reported as `/key=value`
//! - by value, when a `match_by_value` pattern applies: scalar elements are
//!   paired up by equality regardless of position
//! - by index otherwise, reported with 1-based positions
//!
//! When the diff limit is reached the walk stops immediately and the diffs
//! recorded so far are returned. Data errors (a duplicate key, a missing key
//! attribute, a non-object element in a key-matched array, a non-scalar in a
//! value-matched array) abort the comparison with a [`CompareError`].
//!
//! # Examples
//!
//! ```
//! use refcheck::{perform, DiffKind, Flags, Node};
//! use serde_json::json;
//!
//! let reference = Node::from(json!({"a": 1, "b": 2}));
//! let candidate = Node::from(json!({"a": 1, "c": 2}));
//!
//! let diffs = perform(&reference, &candidate, &Flags::default()).unwrap();
//! assert_eq!(diffs.len(), 2);
//! assert_eq!(diffs["/b"].kind, DiffKind::Missing);
//! assert_eq!(diffs["/c"].kind, DiffKind::Extra);
//! ```

use crate::diff::{CutoffReached, DiffKind, Diffs};
use crate::error::{CompareError, PathError, Side};
use crate::flags::Flags;
use crate::path::Path;
use crate::tree::{key_order, Key, Node};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Why the walk stopped before visiting every node.
enum Halt {
    Cutoff,
    Failed(CompareError),
}

impl From<CutoffReached> for Halt {
    fn from(_: CutoffReached) -> Self {
        Halt::Cutoff
    }
}

impl From<CompareError> for Halt {
    fn from(err: CompareError) -> Self {
        Halt::Failed(err)
    }
}

impl From<PathError> for Halt {
    fn from(err: PathError) -> Self {
        Halt::Failed(CompareError::Path(err))
    }
}

type Step = Result<(), Halt>;

/// Key-matched array elements: identity -> (key value, element).
type KeyIndex<'a> = IndexMap<String, (&'a Node, &'a Node)>;

/// Compares `candidate` against `reference`.
///
/// Returns every diff found, in the order found, or as many as the
/// configured limit allows.
///
/// # Errors
///
/// Returns a [`CompareError`] when the documents cannot be compared under
/// the given flags; no partial result is produced in that case.
pub fn perform(reference: &Node, candidate: &Node, flags: &Flags) -> Result<Diffs, CompareError> {
    let mut comparison = Comparison {
        flags,
        diffs: Diffs::for_flags(flags),
    };

    match comparison.compare(reference, candidate, &Path::root()) {
        Ok(()) => {}
        Err(Halt::Cutoff) => {
            tracing::debug!(
                recorded = comparison.diffs.len(),
                "diff limit reached, stopping comparison"
            );
        }
        Err(Halt::Failed(err)) => return Err(err),
    }

    Ok(comparison.diffs)
}

/// [`perform`] with default flags.
pub fn diff(reference: &Node, candidate: &Node) -> Result<Diffs, CompareError> {
    perform(reference, candidate, &Flags::default())
}

struct Comparison<'f> {
    flags: &'f Flags,
    diffs: Diffs,
}

impl Comparison<'_> {
    fn compare(&mut self, reference: &Node, candidate: &Node, path: &Path) -> Step {
        if path.is_excluded(self.flags) {
            tracing::trace!(path = %path, "excluded");
            return Ok(());
        }

        match (reference, candidate) {
            (Node::Object(r), Node::Object(c)) => self.compare_objects(r, c, path),
            (Node::Array(r), Node::Array(c)) => self.compare_arrays(r, c, path),
            (r, c) if r.is_scalar() && c.is_scalar() => self.compare_scalars(r, c, path),
            _ => self.record(DiffKind::TypeMismatch, path, Some(reference), Some(candidate)),
        }
    }

    fn record(
        &mut self,
        kind: DiffKind,
        path: &Path,
        reference: Option<&Node>,
        candidate: Option<&Node>,
    ) -> Step {
        self.diffs.record(kind, path, reference, candidate)?;
        Ok(())
    }

    /// Records a Missing/Extra diff for a child that is not recursed into,
    /// unless that child is excluded.
    fn record_child(
        &mut self,
        kind: DiffKind,
        path: &Path,
        reference: Option<&Node>,
        candidate: Option<&Node>,
    ) -> Step {
        if path.is_excluded(self.flags) {
            tracing::trace!(path = %path, "excluded");
            return Ok(());
        }
        self.record(kind, path, reference, candidate)
    }

    fn compare_objects(
        &mut self,
        reference: &IndexMap<Key, Node>,
        candidate: &IndexMap<Key, Node>,
        path: &Path,
    ) -> Step {
        let reference = self.entries(reference, path);
        let candidate = self.entries(candidate, path);

        for (key, &value) in &reference {
            if !candidate.contains_key(key) {
                let child = path.join(key.as_str())?;
                self.record_child(DiffKind::Missing, &child, Some(value), None)?;
            }
        }

        for (key, &ref_value) in &reference {
            if let Some(&can_value) = candidate.get(key) {
                let child = path.join(key.as_str())?;
                self.compare(ref_value, can_value, &child)?;
            }
        }

        for (key, &value) in &candidate {
            if !reference.contains_key(key) {
                let child = path.join(key.as_str())?;
                self.record_child(DiffKind::Extra, &child, None, Some(value))?;
            }
        }

        Ok(())
    }

    /// Object entries, with keys folded to text when `indifferent_keys` is on.
    ///
    /// When folding makes two keys collide the later entry wins.
    fn entries<'a>(&self, map: &'a IndexMap<Key, Node>, path: &Path) -> IndexMap<Key, &'a Node> {
        if !self.flags.indifferent_keys() {
            return map.iter().map(|(key, value)| (key.clone(), value)).collect();
        }

        let mut entries = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            if entries.insert(key.canonical(), value).is_some() {
                tracing::warn!(path = %path, key = %key, "keys collide under indifferent_keys, keeping the later value");
            }
        }
        entries
    }

    fn compare_arrays(&mut self, reference: &[Node], candidate: &[Node], path: &Path) -> Step {
        if let Some(key) = path.key_for_compare(self.flags)? {
            tracing::debug!(path = %path, key = %key, "comparing array by key");
            self.compare_arrays_by_key(reference, candidate, path, &key)
        } else if self.flags.matches_by_value(path) {
            tracing::debug!(path = %path, "comparing array by value");
            self.compare_arrays_by_value(reference, candidate, path)
        } else {
            self.compare_arrays_by_index(reference, candidate, path)
        }
    }

    fn compare_arrays_by_index(
        &mut self,
        reference: &[Node],
        candidate: &[Node],
        path: &Path,
    ) -> Step {
        let max_len = reference.len().max(candidate.len());

        for i in 0..max_len {
            let child = path.join(&(i + 1).to_string())?;
            match (reference.get(i), candidate.get(i)) {
                (Some(r), Some(c)) => self.compare(r, c, &child)?,
                (Some(r), None) => self.record_child(DiffKind::Missing, &child, Some(r), None)?,
                (None, Some(c)) => self.record_child(DiffKind::Extra, &child, None, Some(c))?,
                (None, None) => {}
            }
        }

        Ok(())
    }

    fn compare_arrays_by_key(
        &mut self,
        reference: &[Node],
        candidate: &[Node],
        path: &Path,
        key: &str,
    ) -> Step {
        let ref_index = self.index_by_key(reference, key, Side::Reference, path)?;
        let can_index = self.index_by_key(candidate, key, Side::Candidate, path)?;

        let mut union: Vec<(&String, &Node)> = ref_index
            .iter()
            .map(|(identity, &(value, _))| (identity, value))
            .collect();
        union.extend(
            can_index
                .iter()
                .filter(|(identity, _)| !ref_index.contains_key(*identity))
                .map(|(identity, &(value, _))| (identity, value)),
        );
        union.sort_by(|a, b| key_order(a.1, b.1));

        for (identity, value) in union {
            let child = key_path(path, key, value)?;
            match (ref_index.get(identity), can_index.get(identity)) {
                (Some(&(_, r)), Some(&(_, c))) => self.compare(r, c, &child)?,
                (Some(&(_, r)), None) => {
                    self.record_child(DiffKind::Missing, &child, Some(r), None)?
                }
                (None, Some(&(_, c))) => {
                    self.record_child(DiffKind::Extra, &child, None, Some(c))?
                }
                (None, None) => {}
            }
        }

        Ok(())
    }

    fn index_by_key<'a>(
        &self,
        elements: &'a [Node],
        key: &str,
        side: Side,
        path: &Path,
    ) -> Result<KeyIndex<'a>, Halt> {
        let mut index = KeyIndex::new();

        for (position, element) in elements.iter().enumerate() {
            let Node::Object(map) = element else {
                return Err(CompareError::TypeMismatch {
                    side,
                    position,
                    found: element.type_name(),
                }
                .into());
            };

            let value = self
                .lookup(map, key)
                .ok_or_else(|| CompareError::NoSuchKey {
                    side,
                    position,
                    key: key.to_string(),
                    keys: map.keys().map(ToString::to_string).collect(),
                })?;

            let identity = self.identity(value);
            if index.contains_key(&identity) {
                return Err(CompareError::DuplicateKey {
                    side,
                    path: key_path(path, key, value)?.to_string(),
                }
                .into());
            }
            index.insert(identity, (value, element));
        }

        Ok(index)
    }

    fn lookup<'a>(&self, map: &'a IndexMap<Key, Node>, key: &str) -> Option<&'a Node> {
        map.get(&Key::Text(key.to_string())).or_else(|| {
            if self.flags.indifferent_keys() {
                map.get(&Key::Scalar(key.to_string()))
            } else {
                None
            }
        })
    }

    /// String that is equal for two key values exactly when they match.
    fn identity(&self, value: &Node) -> String {
        if self.flags.indifferent_values() {
            value.canonical_scalar().inspect()
        } else {
            value.inspect()
        }
    }

    fn compare_arrays_by_value(
        &mut self,
        reference: &[Node],
        candidate: &[Node],
        path: &Path,
    ) -> Step {
        if reference.iter().chain(candidate).any(|node| !node.is_scalar()) {
            return Err(CompareError::BehaviorUndefined {
                path: path.to_string(),
            }
            .into());
        }

        let mut claimed = vec![false; candidate.len()];

        for (i, r) in reference.iter().enumerate() {
            let found =
                (0..candidate.len()).find(|&j| !claimed[j] && self.scalars_equal(r, &candidate[j]));
            match found {
                Some(j) => claimed[j] = true,
                None => {
                    let child = path.join(&(i + 1).to_string())?;
                    self.record_child(DiffKind::Missing, &child, Some(r), None)?;
                }
            }
        }

        // Extra elements are reported at their own candidate position, which
        // may repeat a path already used for a Missing diff above.
        for (j, c) in candidate.iter().enumerate() {
            if !claimed[j] {
                let child = path.join(&(j + 1).to_string())?;
                self.record_child(DiffKind::Extra, &child, None, Some(c))?;
            }
        }

        Ok(())
    }

    fn scalars_equal(&self, a: &Node, b: &Node) -> bool {
        if self.flags.indifferent_values() {
            a.canonical_scalar() == b.canonical_scalar()
        } else {
            a == b
        }
    }

    fn compare_scalars(&mut self, reference: &Node, candidate: &Node, path: &Path) -> Step {
        let mut r = Cow::Borrowed(reference);
        let mut c = Cow::Borrowed(candidate);

        if self.flags.indifferent_values() {
            r = Cow::Owned(reference.canonical_scalar());
            c = Cow::Owned(candidate.canonical_scalar());
        }

        if let Some(normalize) = self.flags.normalizer_for(path) {
            r = Cow::Owned(normalize(&*r));
            c = Cow::Owned(normalize(&*c));
        }

        if r != c {
            self.record(DiffKind::Mismatch, path, Some(reference), Some(candidate))?;
        }

        Ok(())
    }
}

fn key_path(path: &Path, key: &str, value: &Node) -> Result<Path, PathError> {
    path.join(&format!("{}={}", key, value.segment_text()))
}
