//! refcheck - structural comparison of a candidate document against a reference.
//!
//! Two parsed documents (JSON, YAML or TOML) are walked side by side and every
//! structural disagreement is recorded as a [`Diff`] at a canonical path such
//! as `/items/id=42/name`. [`Flags`] control which paths are compared, how
//! arrays are matched up, and how many diffs are collected before stopping.
//!
//! # Example
//!
//! ```
//! use refcheck::{parse_json, perform, DiffKind, Flags};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = parse_json(r#"{"items": [{"id": 1, "qty": 2}, {"id": 2, "qty": 5}]}"#)?;
//! let candidate = parse_json(r#"{"items": [{"id": 2, "qty": 5}, {"id": 1, "qty": 3}]}"#)?;
//!
//! let flags = Flags::builder().match_by_key("/items/:id").build()?;
//! let diffs = perform(&reference, &candidate, &flags)?;
//!
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].kind, DiffKind::Mismatch);
//! assert_eq!(diffs[0].path, "/items/id=1/qty");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod comparison;
pub mod config;
pub mod diff;
pub mod error;
pub mod flags;
pub mod output;
pub mod parser;
pub mod path;
pub mod segment;
pub mod tree;

pub use comparison::{diff, perform};
pub use config::FlagsFile;
pub use diff::{Diff, DiffKind, Diffs};
pub use error::{
    CompareError, ConfigError, DiffsError, FlagError, OutputError, ParseError, PathError,
    RefcheckError, Side,
};
pub use flags::{FlagValue, Flags, FlagsBuilder, Normalizer};
pub use output::{format_diffs, OutputFormat, OutputOptions};
pub use parser::{
    parse_content, parse_file, parse_json, parse_stdin, parse_toml, parse_yaml, FormatHint,
};
pub use path::Path;
pub use segment::PathSegment;
pub use tree::{Key, Node, Number};
