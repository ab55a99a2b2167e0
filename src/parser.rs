//! Document parsing for JSON, YAML and TOML.
//!
//! Every format is converted into the same [`Node`] tree with object keys in
//! document order. The format is picked from the file extension when there
//! is one; otherwise JSON is tried, then YAML, and as a last resort the raw
//! text is taken as a single string so that two unstructured documents can
//! still be compared.
//!
//! # Examples
//!
//! ```no_run
//! use refcheck::parser::parse_file;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = parse_file(Path::new("reference.json"))?;
//! let candidate = parse_file(Path::new("candidate.yaml"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::ParseError;
use crate::tree::{Key, Node};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Which parser to use for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    /// JSON, then YAML, then plain text
    #[default]
    Auto,
    Json,
    Yaml,
    Toml,
}

impl FormatHint {
    /// Picks a parser from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("json") => FormatHint::Json,
            Some("yaml") | Some("yml") => FormatHint::Yaml,
            Some("toml") => FormatHint::Toml,
            _ => FormatHint::Auto,
        }
    }
}

/// Parses a file, choosing the format by extension.
///
/// # Errors
///
/// - `ParseError::FileNotFound` if the file does not exist
/// - `ParseError::ReadError` if it cannot be read
/// - a syntax error variant if the extension names a format and the content
///   is not valid in it
pub fn parse_file(path: &Path) -> Result<Node, ParseError> {
    let name = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(ParseError::file_not_found(name));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(name.clone(), e))?;
    parse_named(&content, FormatHint::from_path(path), &name)
}

/// Reads all of standard input and parses it with the `Auto` chain.
pub fn parse_stdin() -> Result<Node, ParseError> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| ParseError::read_error("<stdin>", e))?;
    parse_named(&content, FormatHint::Auto, "<stdin>")
}

/// Parses in-memory content.
///
/// With [`FormatHint::Auto`] this never fails.
pub fn parse_content(content: &str, hint: FormatHint) -> Result<Node, ParseError> {
    parse_named(content, hint, "<input>")
}

fn parse_named(content: &str, hint: FormatHint, name: &str) -> Result<Node, ParseError> {
    match hint {
        FormatHint::Json => parse_json(content).map_err(|e| ParseError::json_error(name, e)),
        FormatHint::Yaml => parse_yaml(content).map_err(|e| ParseError::yaml_error(name, e)),
        FormatHint::Toml => parse_toml(content).map_err(|e| ParseError::toml_error(name, e)),
        FormatHint::Auto => {
            if let Ok(node) = parse_json(content) {
                tracing::debug!(input = name, "parsed as JSON");
                return Ok(node);
            }
            if let Ok(node) = parse_yaml(content) {
                tracing::debug!(input = name, "parsed as YAML");
                return Ok(node);
            }
            tracing::debug!(input = name, "not JSON or YAML, comparing as text");
            Ok(Node::String(content.to_string()))
        }
    }
}

pub fn parse_json(content: &str) -> Result<Node, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(Node::from(value))
}

pub fn parse_yaml(content: &str) -> Result<Node, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_node(value))
}

/// Parses a TOML document. The top level is always a table.
pub fn parse_toml(content: &str) -> Result<Node, toml::de::Error> {
    let table: toml::Table = toml::from_str(content)?;
    Ok(toml_to_node(toml::Value::Table(table)))
}

/// Converts YAML into a tree. Tags are dropped and the tagged value kept;
/// non-string keys become [`Key::Scalar`].
fn yaml_to_node(value: serde_yaml::Value) -> Node {
    use serde_yaml::Value;

    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Node::from(i)
            } else if let Some(u) = n.as_u64() {
                Node::from(u)
            } else {
                Node::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Node::String(s),
        Value::Sequence(seq) => Node::Array(seq.into_iter().map(yaml_to_node).collect()),
        Value::Mapping(map) => Node::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_node(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_node(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> Key {
    match key {
        serde_yaml::Value::String(s) => Key::Text(s),
        other => Key::Scalar(yaml_to_node(other).segment_text()),
    }
}

fn toml_to_node(value: toml::Value) -> Node {
    use toml::Value;

    match value {
        Value::String(s) => Node::String(s),
        Value::Integer(i) => Node::from(i),
        Value::Float(f) => Node::from(f),
        Value::Boolean(b) => Node::Bool(b),
        Value::Datetime(dt) => Node::String(dt.to_string()),
        Value::Array(items) => Node::Array(items.into_iter().map(toml_to_node).collect()),
        Value::Table(table) => Node::Object(
            table
                .into_iter()
                .map(|(k, v)| (Key::Text(k), toml_to_node(v)))
                .collect(),
        ),
    }
}
