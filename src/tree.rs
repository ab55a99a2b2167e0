//! Tree representation for parsed documents.
//!
//! Both inputs of a comparison are [`Node`] trees. Objects keep their keys in
//! insertion order so diffs come out in document order.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;

/// An object key.
///
/// JSON and TOML keys are always text. YAML also allows bare scalar keys
/// (`1: one`, `true: yes`); those keep their source text but stay distinct
/// from the quoted form unless `indifferent_keys` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Text(String),
    Scalar(String),
}

impl Key {
    pub fn as_str(&self) -> &str {
        match self {
            Key::Text(s) | Key::Scalar(s) => s,
        }
    }

    /// The text form of this key.
    pub fn canonical(&self) -> Key {
        Key::Text(self.as_str().to_string())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

/// A numeric scalar, kept exactly as parsed.
///
/// Integers never pass through `f64`, so ids above 2^53 stay distinct.
/// Equality is by numeric value across representations: `1 == 1.0`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    /// Only for values above `i64::MAX`
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// The exact integer value, if this number has one.
    fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::Int(i) => Some(i128::from(i)),
            Number::UInt(u) => Some(i128::from(u)),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.0e38 => {
                Some(f as i128)
            }
            Number::Float(_) => None,
        }
    }

    /// Numeric order; integers compare exactly, NaN sorts last.
    pub fn total_cmp(&self, other: &Number) -> Ordering {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match *self {
            Number::Int(i) => Value::from(i),
            Number::UInt(u) => Value::from(u),
            Number::Float(f) => match float_as_i64(f) {
                Some(i) => Value::from(i),
                None => serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            },
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.as_f64() == other.as_f64(),
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            Number::UInt(u) => write!(f, "{}", u),
            Number::Float(n) => match float_as_i64(n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<u64> for Number {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Number::UInt(u), Number::Int)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl From<serde_json::Number> for Number {
    fn from(n: serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else if let Some(u) = n.as_u64() {
            Number::UInt(u)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A node representing a value in structured data (JSON, YAML, TOML).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(IndexMap<Key, Node>),
}

/// Shape classification used to pick a comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Array,
    Object,
    Other,
}

impl Node {
    /// Builds an object from `(key, value)` pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Node
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
            _ => Kind::Other,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.kind() == Kind::Other
    }

    /// Rewrites booleans and numbers into their string form; used when
    /// `indifferent_values` is on so that `42` and `"42"` compare equal.
    pub fn canonical_scalar(&self) -> Node {
        match self {
            Node::Bool(b) => Node::String(b.to_string()),
            Node::Number(n) => Node::String(n.to_string()),
            other => other.clone(),
        }
    }

    /// Raw text of a scalar as it appears inside a `key=value` path segment.
    pub fn segment_text(&self) -> String {
        match self {
            Node::String(s) => s.clone(),
            Node::Number(n) => n.to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Null => "null".to_string(),
            container => container.inspect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => n.to_json(),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Compact single-line rendering with strings quoted.
    pub fn inspect(&self) -> String {
        self.to_json().to_string()
    }

    /// Returns a short preview of the node's value, truncated to max_len characters.
    pub fn preview(&self, max_len: usize) -> String {
        truncate(&self.inspect(), max_len)
    }
}

/// Total order over nodes, used to sort the key values of key-matched arrays.
///
/// Types rank `null < boolean < number < string < array < object`; values of
/// the same scalar type compare naturally, containers by their rendering.
pub fn key_order(a: &Node, b: &Node) -> Ordering {
    fn rank(node: &Node) -> u8 {
        match node {
            Node::Null => 0,
            Node::Bool(_) => 1,
            Node::Number(_) => 2,
            Node::String(_) => 3,
            Node::Array(_) => 4,
            Node::Object(_) => 5,
        }
    }

    match (a, b) {
        (Node::Bool(x), Node::Bool(y)) => x.cmp(y),
        (Node::Number(x), Node::Number(y)) => x.total_cmp(y),
        (Node::String(x), Node::String(y)) => x.cmp(y),
        (Node::Null, Node::Null) => Ordering::Equal,
        _ if rank(a) == rank(b) => a.inspect().cmp(&b.inspect()),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Cuts `s` to at most `max_len` characters, ending in `...` when shortened.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

/// Integral floats within `i64` range render without a fraction, so that
/// `1.0` and `1` print and identify alike.
fn float_as_i64(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Bool(b),
            serde_json::Value::Number(n) => Node::Number(Number::from(n)),
            serde_json::Value::String(s) => Node::String(s),
            serde_json::Value::Array(arr) => Node::Array(arr.into_iter().map(Node::from).collect()),
            serde_json::Value::Object(obj) => Node::Object(
                obj.into_iter()
                    .map(|(k, v)| (Key::Text(k), Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(Number::Int(n))
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Number(Number::from(n))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Number(Number::Float(n))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(Node::from(1_i64), Node::from(1.0));
        assert_ne!(Node::from(1_i64), Node::from("1"));
        assert_ne!(Node::from(1_i64), Node::from(1.5));
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let a = Node::from(9_007_199_254_740_993_i64);
        let b = Node::from(9_007_199_254_740_992_i64);
        assert_ne!(a, b);
        assert_eq!(a.segment_text(), "9007199254740993");
        assert_eq!(key_order(&a, &b), Ordering::Greater);
        assert_eq!(Node::from(u64::MAX).inspect(), "18446744073709551615");
        assert_ne!(Node::from(u64::MAX), Node::from(u64::MAX - 1));
    }

    #[test]
    fn test_integral_float_equals_integer() {
        assert_eq!(Number::Float(9_007_199_254_740_992.0), Number::Int(9_007_199_254_740_992));
        assert_ne!(Number::Float(9_007_199_254_740_992.0), Number::Int(9_007_199_254_740_993));
        assert_eq!(Number::Float(2.0).to_string(), "2");
        assert_eq!(Number::from(5_u64), Number::Int(5));
        assert!(matches!(Number::from(5_u64), Number::Int(5)));
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let a = Node::from(json!({"a": 1, "b": 2}));
        let b = Node::from(json!({"b": 2, "a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let node = Node::from(json!({"zeta": 1, "alpha": 2}));
        match node {
            Node::Object(map) => {
                let keys: Vec<&str> = map.keys().map(Key::as_str).collect();
                assert_eq!(keys, vec!["zeta", "alpha"]);
            }
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_canonical_scalar() {
        assert_eq!(Node::from(42_i64).canonical_scalar(), Node::from("42"));
        assert_eq!(Node::Bool(true).canonical_scalar(), Node::from("true"));
        assert_eq!(Node::from(1.5).canonical_scalar(), Node::from("1.5"));
        assert_eq!(Node::Null.canonical_scalar(), Node::Null);
    }

    #[test]
    fn test_inspect() {
        assert_eq!(Node::from("wibble").inspect(), "\"wibble\"");
        assert_eq!(Node::from(3.0).inspect(), "3");
        assert_eq!(Node::from(json!([4, 5, 6])).inspect(), "[4,5,6]");
    }

    #[test]
    fn test_segment_text() {
        assert_eq!(Node::from("abc").segment_text(), "abc");
        assert_eq!(Node::from(42_i64).segment_text(), "42");
        assert_eq!(Node::Null.segment_text(), "null");
    }

    #[test]
    fn test_key_order() {
        let mut keys = vec![
            Node::from("b"),
            Node::from(10_i64),
            Node::from("a"),
            Node::from(2_i64),
            Node::Null,
        ];
        keys.sort_by(key_order);
        assert_eq!(
            keys,
            vec![
                Node::Null,
                Node::from(2_i64),
                Node::from(10_i64),
                Node::from("a"),
                Node::from("b"),
            ]
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let node = Node::from("héllo wörld, this is long");
        let preview = node.preview(10);
        assert_eq!(preview.chars().count(), 10);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_key_canonical() {
        assert_eq!(Key::Scalar("1".into()).canonical(), Key::from("1"));
        assert_ne!(Key::Scalar("1".into()), Key::from("1"));
    }
}
