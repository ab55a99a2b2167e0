//! refcheck command-line interface.
//!
//! Parses a reference and a candidate document, compares them under the
//! flags given on the command line (and optionally a TOML config file), and
//! prints the diffs. The exit code is 0 when the documents match, 1 when
//! diffs were found and 2 on any error.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use refcheck::{
    format_diffs, parse_file, parse_stdin, perform, Flags, FlagsFile, Node, OutputFormat,
    OutputOptions,
};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::prelude::*;

/// Compare a candidate JSON/YAML/TOML document against a reference
#[derive(Parser)]
#[command(name = "refcheck")]
#[command(version)]
#[command(about = "Structural comparison of a candidate document against a reference", long_about = None)]
struct Cli {
    /// The document considered correct
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// The document to check; read from stdin when omitted
    #[arg(value_name = "CANDIDATE")]
    candidate: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormatArg>,

    /// Stop after recording this many diffs
    #[arg(short = 'n', long, value_name = "N")]
    max_diffs: Option<String>,

    /// Stop after the first diff
    #[arg(long)]
    fail_fast: bool,

    /// Do not compare below this depth (the root has depth 1)
    #[arg(short = 'd', long, value_name = "N")]
    max_depth: Option<String>,

    /// Only compare paths matching this pattern (repeatable)
    #[arg(short = 's', long = "select-paths", value_name = "PATH")]
    select_paths: Vec<String>,

    /// Skip paths matching this pattern (repeatable)
    #[arg(short = 'r', long = "reject-paths", value_name = "PATH")]
    reject_paths: Vec<String>,

    /// Match array elements by a key, e.g. /items/:id (repeatable)
    #[arg(long, value_name = "PATH")]
    match_by_key: Vec<String>,

    /// Match scalar array elements by value regardless of order (repeatable)
    #[arg(long, value_name = "PATH")]
    match_by_value: Vec<String>,

    /// Treat non-string object keys as their text form
    #[arg(long)]
    indifferent_keys: bool,

    /// Compare numbers and booleans by their text form
    #[arg(long)]
    indifferent_values: bool,

    /// Read flags from a TOML file; command-line flags are applied after it
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print nothing; report through the exit code only
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormatArg {
    /// Aligned columns
    Table,
    /// One JSON object per diff
    Json,
    /// Full values, one block per diff
    Long,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Long => OutputFormat::Long,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let mut file = match &cli.config {
        Some(path) => FlagsFile::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => FlagsFile::default(),
    };

    let format = match (cli.format, file.format.take()) {
        (Some(arg), _) => arg.into(),
        (None, Some(name)) => name
            .parse::<OutputFormat>()
            .context("Invalid format in config file")?,
        (None, None) => OutputFormat::default(),
    };

    let flags = build_flags(&cli, file)?;
    tracing::debug!(?flags, "resolved flags");

    let reference = parse_file(&cli.reference)
        .with_context(|| format!("Failed to parse reference: {}", cli.reference.display()))?;
    tracing::info!(path = %cli.reference.display(), "parsed reference");

    let candidate = read_candidate(&cli)?;

    let diffs = perform(&reference, &candidate, &flags).context("Comparison failed")?;
    tracing::info!(count = diffs.len(), "comparison finished");

    if !cli.quiet {
        let options = OutputOptions {
            color: !cli.no_color && io::stdout().is_terminal(),
            ..OutputOptions::default()
        };
        let output = format_diffs(&diffs, format, &options).context("Failed to format diffs")?;
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    if diffs.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn read_candidate(cli: &Cli) -> Result<Node> {
    match &cli.candidate {
        Some(path) => {
            let node = parse_file(path)
                .with_context(|| format!("Failed to parse candidate: {}", path.display()))?;
            tracing::info!(path = %path.display(), "parsed candidate");
            Ok(node)
        }
        None if !io::stdin().is_terminal() => {
            let node = parse_stdin().context("Failed to read candidate from stdin")?;
            tracing::info!("parsed candidate from stdin");
            Ok(node)
        }
        None => bail!("No candidate given: pass a CANDIDATE file or pipe one on stdin"),
    }
}

/// Config file values first, then the command line on top.
fn build_flags(cli: &Cli, file: FlagsFile) -> Result<Flags> {
    let mut builder = file
        .apply(Flags::builder())
        .context("Invalid config file")?;

    if let Some(n) = &cli.max_diffs {
        builder = builder.max_diffs(n.as_str());
    }
    if cli.fail_fast {
        builder = builder.fail_fast(true);
    }
    if let Some(n) = &cli.max_depth {
        builder = builder.max_depth(n.as_str());
    }
    for path in &cli.select_paths {
        builder = builder.select_paths(path.as_str());
    }
    for path in &cli.reject_paths {
        builder = builder.reject_paths(path.as_str());
    }
    for path in &cli.match_by_key {
        builder = builder.match_by_key(path.as_str());
    }
    for path in &cli.match_by_value {
        builder = builder.match_by_value(path.as_str());
    }
    if cli.indifferent_keys {
        builder = builder.indifferent_keys(true);
    }
    if cli.indifferent_values {
        builder = builder.indifferent_values(true);
    }

    builder.build().context("Invalid flags")
}
