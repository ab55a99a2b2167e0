//! Output formatting for diff results.
//!
//! Three printers are available:
//!
//! - `table`: one row per diff under a `TYPE | PATH | REFERENCE | CANDIDATE`
//!   header, long values truncated
//! - `json`: an array with one compact object per line
//! - `long`: one block per diff with full values
//!
//! # Examples
//!
//! ```
//! use refcheck::{diff, format_diffs, Node, OutputFormat, OutputOptions};
//!
//! let reference = Node::object([("answer", Node::from(42_i64))]);
//! let candidate = Node::object([("answer", Node::from(43_i64))]);
//! let diffs = diff(&reference, &candidate).unwrap();
//!
//! let output = format_diffs(&diffs, OutputFormat::Long, &OutputOptions::default()).unwrap();
//! assert_eq!(output, "/answer [mismatch]\n  reference: 42\n  candidate: 43");
//! ```

use crate::diff::{Diff, DiffKind, Diffs};
use crate::error::OutputError;
use crate::tree::{truncate, Node};
use colored::*;
use std::fmt;
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned columns, values truncated
    #[default]
    Table,
    /// Machine-readable, one diff per line
    Json,
    /// Full values, one block per diff
    Long,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Long, OutputFormat::Table];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Long => "long",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OutputError::UnknownFormat {
                format: s.to_string(),
            })
    }
}

/// Options for controlling output formatting.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Color the diff type with ANSI escape codes
    pub color: bool,
    /// Table cells holding values are cut to this many characters
    pub max_value_width: usize,
    /// Table cells holding paths are cut to this many characters
    pub max_path_width: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            color: false,
            max_value_width: 30,
            max_path_width: 250,
        }
    }
}

/// Renders `diffs` in recording order.
///
/// An empty collection renders as `""` for `table` and `long`, and as `[]`
/// for `json`.
pub fn format_diffs(
    diffs: &Diffs,
    format: OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Table => Ok(format_table(diffs, options)),
        OutputFormat::Json => format_json(diffs),
        OutputFormat::Long => Ok(format_long(diffs, options)),
    }
}

const HEADERS: [&str; 4] = ["TYPE", "PATH", "REFERENCE", "CANDIDATE"];

fn format_table(diffs: &Diffs, options: &OutputOptions) -> String {
    if diffs.is_empty() {
        return String::new();
    }

    let rows: Vec<[String; 4]> = diffs
        .iter()
        .map(|diff| {
            [
                diff.kind.to_string(),
                truncate(&diff.path, options.max_path_width),
                table_cell(diff.reference.as_ref(), options.max_value_width),
                table_cell(diff.candidate.as_ref(), options.max_value_width),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join_row(&HEADERS.map(String::from), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-|-"),
    );

    for (row, diff) in rows.iter().zip(diffs) {
        let mut line = join_row(row, &widths);
        if options.color {
            // Padding is computed on the plain text, so only the leading
            // type name is swapped for its colored form.
            let name = diff.kind.as_str();
            line = format!("{}{}", paint(diff.kind, name), &line[name.len()..]);
        }
        lines.push(line);
    }

    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

fn table_cell(value: Option<&Node>, max_width: usize) -> String {
    value
        .map(|node| node.preview(max_width))
        .unwrap_or_default()
}

fn join_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn format_json(diffs: &Diffs) -> Result<String, OutputError> {
    if diffs.is_empty() {
        return Ok("[]".to_string());
    }

    let entries = diffs
        .iter()
        .map(|diff| json_entry(diff).map(|entry| format!("  {}", entry)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("[\n{}\n]", entries.join(",\n")))
}

/// One diff as pretty JSON folded onto a single line.
fn json_entry(diff: &Diff) -> Result<String, OutputError> {
    use serde_json::json;

    let value = json!({
        "type": diff.kind.as_str(),
        "path": diff.path,
        "reference": diff.reference.as_ref().map(Node::to_json),
        "candidate": diff.candidate.as_ref().map(Node::to_json),
    });

    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|e| OutputError::JsonSerializationError { source: e })?;

    Ok(pretty
        .lines()
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join(" "))
}

fn format_long(diffs: &Diffs, options: &OutputOptions) -> String {
    diffs
        .iter()
        .map(|diff| {
            let label = if options.color {
                paint(diff.kind, diff.kind.as_str()).to_string()
            } else {
                diff.kind.to_string()
            };
            format!(
                "{} [{}]\n  reference: {}\n  candidate: {}",
                diff.path,
                label,
                long_value(diff.reference.as_ref()),
                long_value(diff.candidate.as_ref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn long_value(value: Option<&Node>) -> String {
    value
        .map(Node::inspect)
        .unwrap_or_else(|| "[no value]".to_string())
}

fn paint(kind: DiffKind, text: &str) -> ColoredString {
    match kind {
        DiffKind::Missing => text.red(),
        DiffKind::Extra => text.green(),
        DiffKind::Mismatch => text.yellow(),
        DiffKind::TypeMismatch => text.magenta(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::diff;
    use serde_json::json;

    fn diffs_for(reference: serde_json::Value, candidate: serde_json::Value) -> Diffs {
        diff(&Node::from(reference), &Node::from(candidate)).unwrap()
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("long".parse::<OutputFormat>().unwrap(), OutputFormat::Long);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(OutputError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_table_simple() {
        let diffs = diffs_for(json!({"foo": "wibble"}), json!({"bar": "wibble"}));
        let output = format_diffs(&diffs, OutputFormat::Table, &OutputOptions::default()).unwrap();
        let expected = "\
TYPE    | PATH | REFERENCE | CANDIDATE
--------|------|-----------|----------
missing | /foo | \"wibble\"  |
extra   | /bar |           | \"wibble\"";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_json_simple() {
        let diffs = diffs_for(json!({"foo": "wibble"}), json!({"bar": "wibble"}));
        let output = format_diffs(&diffs, OutputFormat::Json, &OutputOptions::default()).unwrap();
        let expected = r#"[
  { "type": "missing", "path": "/foo", "reference": "wibble", "candidate": null },
  { "type": "extra", "path": "/bar", "reference": null, "candidate": "wibble" }
]"#;
        assert_eq!(output, expected);
    }

    #[test]
    fn test_json_folds_nested_values() {
        let diffs = diffs_for(json!({"a": {"b": 1}}), json!({"a": [1, 2]}));
        let output = format_diffs(&diffs, OutputFormat::Json, &OutputOptions::default()).unwrap();
        assert!(output.contains(r#""reference": { "b": 1 }, "candidate": [ 1, 2 ]"#));
    }

    #[test]
    fn test_empty_outputs() {
        let diffs = Diffs::new();
        let options = OutputOptions::default();
        assert_eq!(format_diffs(&diffs, OutputFormat::Table, &options).unwrap(), "");
        assert_eq!(format_diffs(&diffs, OutputFormat::Json, &options).unwrap(), "[]");
        assert_eq!(format_diffs(&diffs, OutputFormat::Long, &options).unwrap(), "");
    }

    #[test]
    fn test_colored_table_keeps_alignment() {
        colored::control::set_override(true);
        let diffs = diffs_for(json!({"foo": 1}), json!({"foo": 2}));
        let options = OutputOptions {
            color: true,
            ..OutputOptions::default()
        };
        let output = format_diffs(&diffs, OutputFormat::Table, &options).unwrap();
        colored::control::unset_override();

        let row = output.lines().nth(2).unwrap();
        assert!(row.starts_with("\u{1b}["));
        assert!(row.ends_with(" | /foo | 1         | 2"));
    }
}
