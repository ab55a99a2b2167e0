//! Validated configuration for one comparison run.
//!
//! Options are collected on a [`FlagsBuilder`] as loosely-typed
//! [`FlagValue`]s (the shape they arrive in from the command line or a
//! config file) and coerced and validated once, in [`FlagsBuilder::build`].
//! The resulting [`Flags`] is immutable.
//!
//! # Examples
//!
//! ```
//! use refcheck::flags::Flags;
//!
//! let flags = Flags::builder()
//!     .max_diffs("10")
//!     .select_paths("/items")
//!     .select_paths("/meta")
//!     .match_by_key("/items/:id")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(flags.max_diffs(), Some(10));
//! assert_eq!(flags.select_paths().len(), 2);
//!
//! assert!(Flags::builder().max_depth(0).build().is_err());
//! ```

use crate::error::FlagError;
use crate::path::Path;
use crate::tree::Node;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Transform applied to both sides of a scalar comparison.
pub type Normalizer = Arc<dyn Fn(&Node) -> Node + Send + Sync>;

/// A raw flag value before coercion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FlagValue>),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Int(n) => write!(f, "{}", n),
            FlagValue::Float(n) => write!(f, "{}", n),
            FlagValue::Str(s) => write!(f, "{:?}", s),
            FlagValue::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        FlagValue::Bool(b)
    }
}

impl From<i64> for FlagValue {
    fn from(n: i64) -> Self {
        FlagValue::Int(n)
    }
}

impl From<i32> for FlagValue {
    fn from(n: i32) -> Self {
        FlagValue::Int(i64::from(n))
    }
}

impl From<usize> for FlagValue {
    fn from(n: usize) -> Self {
        FlagValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FlagValue {
    fn from(n: f64) -> Self {
        FlagValue::Float(n)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        FlagValue::Str(s.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> Self {
        FlagValue::Str(s)
    }
}

impl<T: Into<FlagValue>> From<Vec<T>> for FlagValue {
    fn from(items: Vec<T>) -> Self {
        FlagValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Collects raw flag values. Path-list setters append rather than replace,
/// so a repeated command-line flag accumulates.
#[derive(Clone, Default)]
pub struct FlagsBuilder {
    max_diffs: Option<FlagValue>,
    fail_fast: Option<FlagValue>,
    max_depth: Option<FlagValue>,
    select_paths: Vec<FlagValue>,
    reject_paths: Vec<FlagValue>,
    match_by_key: Vec<FlagValue>,
    match_by_value: Vec<FlagValue>,
    indifferent_keys: Option<FlagValue>,
    indifferent_values: Option<FlagValue>,
    normalize_values: Vec<(FlagValue, Normalizer)>,
}

impl FlagsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop recording after this many diffs. Must be a positive integer.
    pub fn max_diffs(mut self, value: impl Into<FlagValue>) -> Self {
        self.max_diffs = Some(value.into());
        self
    }

    /// Stop after the first diff. Anything other than `false` turns this on.
    pub fn fail_fast(mut self, value: impl Into<FlagValue>) -> Self {
        self.fail_fast = Some(value.into());
        self
    }

    /// Do not descend below this depth (the root has depth 1).
    pub fn max_depth(mut self, value: impl Into<FlagValue>) -> Self {
        self.max_depth = Some(value.into());
        self
    }

    pub fn select_paths(mut self, value: impl Into<FlagValue>) -> Self {
        self.select_paths.push(value.into());
        self
    }

    pub fn reject_paths(mut self, value: impl Into<FlagValue>) -> Self {
        self.reject_paths.push(value.into());
        self
    }

    pub fn match_by_key(mut self, value: impl Into<FlagValue>) -> Self {
        self.match_by_key.push(value.into());
        self
    }

    pub fn match_by_value(mut self, value: impl Into<FlagValue>) -> Self {
        self.match_by_value.push(value.into());
        self
    }

    pub fn indifferent_keys(mut self, value: impl Into<FlagValue>) -> Self {
        self.indifferent_keys = Some(value.into());
        self
    }

    pub fn indifferent_values(mut self, value: impl Into<FlagValue>) -> Self {
        self.indifferent_values = Some(value.into());
        self
    }

    /// Registers a transform applied to both scalars at paths matching
    /// `pattern` before they are compared.
    pub fn normalize_values<F>(mut self, pattern: impl Into<FlagValue>, normalizer: F) -> Self
    where
        F: Fn(&Node) -> Node + Send + Sync + 'static,
    {
        self.normalize_values
            .push((pattern.into(), Arc::new(normalizer)));
        self
    }

    /// Sets a flag by name (`max_diffs` or `max-diffs`).
    ///
    /// # Errors
    ///
    /// Returns `FlagError::UnknownFlag` for names that are not flags.
    /// Normalizers cannot be set by name.
    pub fn set(self, name: &str, value: impl Into<FlagValue>) -> Result<Self, FlagError> {
        let value = value.into();
        let builder = match name.replace('-', "_").as_str() {
            "max_diffs" => self.max_diffs(value),
            "fail_fast" => self.fail_fast(value),
            "max_depth" => self.max_depth(value),
            "select_paths" => self.select_paths(value),
            "reject_paths" => self.reject_paths(value),
            "match_by_key" => self.match_by_key(value),
            "match_by_value" => self.match_by_value(value),
            "indifferent_keys" => self.indifferent_keys(value),
            "indifferent_values" => self.indifferent_values(value),
            _ => {
                return Err(FlagError::UnknownFlag {
                    name: name.to_string(),
                })
            }
        };
        Ok(builder)
    }

    /// Coerces and validates every value.
    ///
    /// # Errors
    ///
    /// - `FlagError::InvalidFlag` for a count that is not a positive integer
    /// - `FlagError::InvalidPattern` for a path that does not parse
    /// - `FlagError::Conflict` when both select and reject paths are given
    pub fn build(self) -> Result<Flags, FlagError> {
        let max_diffs = self
            .max_diffs
            .as_ref()
            .map(|v| coerce_count("max_diffs", v))
            .transpose()?;
        let max_depth = self
            .max_depth
            .as_ref()
            .map(|v| coerce_count("max_depth", v))
            .transpose()?;

        let select_paths = reify_paths("select_paths", &self.select_paths)?;
        let reject_paths = reify_paths("reject_paths", &self.reject_paths)?;
        if !select_paths.is_empty() && !reject_paths.is_empty() {
            return Err(FlagError::Conflict);
        }

        let match_by_key = reify_paths("match_by_key", &self.match_by_key)?;
        for pattern in &match_by_key {
            if !pattern.segments().iter().any(|s| s.is_key_expr()) {
                tracing::warn!(pattern = %pattern, "match_by_key pattern has no :key segment and will never apply");
            }
        }
        let match_by_value = reify_paths("match_by_value", &self.match_by_value)?;

        let mut normalize_values = Vec::with_capacity(self.normalize_values.len());
        for (pattern, normalizer) in self.normalize_values {
            for path in reify_paths("normalize_values", std::slice::from_ref(&pattern))? {
                normalize_values.push((path, Arc::clone(&normalizer)));
            }
        }

        let key_patterns = unpack_key_patterns(&match_by_key);

        Ok(Flags {
            max_diffs,
            fail_fast: self.fail_fast.as_ref().is_some_and(coerce_bool),
            max_depth,
            select_paths,
            reject_paths,
            match_by_key,
            match_by_value,
            indifferent_keys: self.indifferent_keys.as_ref().is_some_and(coerce_bool),
            indifferent_values: self.indifferent_values.as_ref().is_some_and(coerce_bool),
            normalize_values,
            key_patterns,
        })
    }
}

impl fmt::Debug for FlagsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagsBuilder")
            .field("max_diffs", &self.max_diffs)
            .field("fail_fast", &self.fail_fast)
            .field("max_depth", &self.max_depth)
            .field("select_paths", &self.select_paths)
            .field("reject_paths", &self.reject_paths)
            .field("match_by_key", &self.match_by_key)
            .field("match_by_value", &self.match_by_value)
            .field("indifferent_keys", &self.indifferent_keys)
            .field("indifferent_values", &self.indifferent_values)
            .field("normalize_values", &self.normalize_values.len())
            .finish()
    }
}

/// The options that parameterize a comparison.
#[derive(Clone, Default)]
pub struct Flags {
    max_diffs: Option<usize>,
    fail_fast: bool,
    max_depth: Option<usize>,
    select_paths: Vec<Path>,
    reject_paths: Vec<Path>,
    match_by_key: Vec<Path>,
    match_by_value: Vec<Path>,
    indifferent_keys: bool,
    indifferent_values: bool,
    normalize_values: Vec<(Path, Normalizer)>,
    key_patterns: Vec<Path>,
}

impl Flags {
    pub fn builder() -> FlagsBuilder {
        FlagsBuilder::new()
    }

    pub fn max_diffs(&self) -> Option<usize> {
        self.max_diffs
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn select_paths(&self) -> &[Path] {
        &self.select_paths
    }

    pub fn reject_paths(&self) -> &[Path] {
        &self.reject_paths
    }

    pub fn match_by_key(&self) -> &[Path] {
        &self.match_by_key
    }

    pub fn match_by_value(&self) -> &[Path] {
        &self.match_by_value
    }

    pub fn indifferent_keys(&self) -> bool {
        self.indifferent_keys
    }

    pub fn indifferent_values(&self) -> bool {
        self.indifferent_values
    }

    /// Every key expression reachable from `match_by_key`, including the
    /// shorter ones embedded in compound patterns, without duplicates.
    pub fn key_patterns(&self) -> &[Path] {
        &self.key_patterns
    }

    /// How many diffs may be recorded before the comparison stops.
    pub fn cutoff(&self) -> Option<usize> {
        if self.fail_fast {
            Some(1)
        } else {
            self.max_diffs
        }
    }

    pub fn matches_by_value(&self, path: &Path) -> bool {
        self.match_by_value.iter().any(|pattern| pattern.matches(path))
    }

    /// The first registered normalizer whose pattern matches `path`.
    pub fn normalizer_for(&self, path: &Path) -> Option<&Normalizer> {
        self.normalize_values
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, normalizer)| normalizer)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normalized: Vec<&Path> = self.normalize_values.iter().map(|(p, _)| p).collect();
        f.debug_struct("Flags")
            .field("max_diffs", &self.max_diffs)
            .field("fail_fast", &self.fail_fast)
            .field("max_depth", &self.max_depth)
            .field("select_paths", &self.select_paths)
            .field("reject_paths", &self.reject_paths)
            .field("match_by_key", &self.match_by_key)
            .field("match_by_value", &self.match_by_value)
            .field("indifferent_keys", &self.indifferent_keys)
            .field("indifferent_values", &self.indifferent_values)
            .field("normalize_values", &normalized)
            .finish()
    }
}

fn coerce_count(flag: &'static str, value: &FlagValue) -> Result<usize, FlagError> {
    let n = match value {
        FlagValue::Int(n) => *n,
        FlagValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FlagError::invalid(flag, value))?,
        _ => return Err(FlagError::invalid(flag, value)),
    };
    if n <= 0 {
        return Err(FlagError::invalid(flag, value));
    }
    usize::try_from(n).map_err(|_| FlagError::invalid(flag, value))
}

fn coerce_bool(value: &FlagValue) -> bool {
    !matches!(value, FlagValue::Bool(false))
}

fn reify_paths(flag: &'static str, values: &[FlagValue]) -> Result<Vec<Path>, FlagError> {
    let mut paths = Vec::new();
    for value in values {
        match value {
            FlagValue::Str(s) => paths.push(parse_pattern(flag, s)?),
            FlagValue::Int(n) => paths.push(parse_pattern(flag, &n.to_string())?),
            FlagValue::List(items) => paths.extend(reify_paths(flag, items)?),
            other => return Err(FlagError::invalid(flag, other)),
        }
    }
    Ok(paths)
}

fn parse_pattern(flag: &'static str, s: &str) -> Result<Path, FlagError> {
    Path::parse(s).map_err(|source| FlagError::InvalidPattern { flag, source })
}

fn unpack_key_patterns(match_by_key: &[Path]) -> Vec<Path> {
    let mut unpacked: Vec<Path> = Vec::new();
    for expr in match_by_key.iter().flat_map(Path::key_exprs) {
        if !unpacked.contains(&expr) {
            unpacked.push(expr);
        }
    }
    unpacked
}
