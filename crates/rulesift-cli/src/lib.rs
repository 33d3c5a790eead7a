//! Command-line front end for rulesift.
//!
//! Reads a filter definition (the JSON group format understood by
//! [`rulesift::parse_groups`]), compiles it once, and applies it to a
//! stream of JSON documents:
//!
//! ```text
//! rulesift --filter adults.json people.jsonl
//! cat orders.json | rulesift --filter paid.json --schema orders.schema.json --count
//! ```
//!
//! Documents are read either as a single JSON array or as JSON lines.
//! Matching documents are written back in the same shape unless
//! `--format` says otherwise.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use rulesift::{parse_groups, FieldRuleCompiler, PredicateCompiler, Schema};
use serde_json::Value as Json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter JSON documents with nested AND/OR rule groups.
#[derive(Debug, Parser)]
#[command(name = "rulesift", version, about)]
pub struct Cli {
    /// Filter definition file (a group object or an array of groups)
    #[arg(short, long, env = "RULESIFT_FILTER", value_name = "FILE")]
    pub filter: PathBuf,

    /// Field schema file mapping field names to kinds
    #[arg(short, long, env = "RULESIFT_SCHEMA", value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Print the number of matching documents instead of the documents
    #[arg(short, long)]
    pub count: bool,

    /// Input and output layout
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    pub format: Format,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Input file; stdin when omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

/// Document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Detect from the input: a leading `[` means an array
    Auto,
    /// A single JSON array
    Json,
    /// One JSON document per line
    Jsonl,
}

impl Format {
    fn detect(input: &str) -> Format {
        if input.trim_start().starts_with('[') {
            Format::Json
        } else {
            Format::Jsonl
        }
    }
}

/// Log level selected by the `-v` count.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins unless `-v` was given.
pub fn init_logging(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new(log_level(verbose))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(0)))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one filter pass.
///
/// `stdin` is only read when no input file was given.
pub fn run<R: Read, W: Write>(cli: &Cli, mut stdin: R, mut out: W) -> anyhow::Result<()> {
    let filter = &cli.filter;
    let definition = read_file(filter, "filter")?;
    let groups = parse_groups(&definition)
        .with_context(|| format!("failed to parse filter {}", filter.display()))?;

    let mut rule_compiler = FieldRuleCompiler::<Json, _>::filterable();
    if let Some(path) = &cli.schema {
        let schema = Schema::from_json(&read_file(path, "schema")?)
            .with_context(|| format!("failed to parse schema {}", path.display()))?;
        rule_compiler = rule_compiler.with_schema(schema);
    }
    let predicate = PredicateCompiler::new(rule_compiler).compile_groups(&groups);

    let input = match &cli.input {
        Some(path) => read_file(path, "input")?,
        None => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    let input_format = match cli.format {
        Format::Auto => Format::detect(&input),
        explicit => explicit,
    };
    let documents = parse_documents(&input, input_format)?;
    debug!(
        documents = documents.len(),
        format = ?input_format,
        "documents loaded"
    );

    if cli.count {
        writeln!(out, "{}", predicate.count(&documents))?;
        return Ok(());
    }

    let matches = predicate.filter(&documents);
    debug!(matches = matches.len(), "filter applied");
    write_documents(&mut out, &matches, input_format)?;
    out.flush()?;
    Ok(())
}

fn read_file(path: &Path, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))
}

fn parse_documents(input: &str, format: Format) -> anyhow::Result<Vec<Json>> {
    match format {
        Format::Json => {
            let value: Json = serde_json::from_str(input).context("invalid JSON input")?;
            match value {
                Json::Array(items) => Ok(items),
                other => bail!("expected an array of documents, found {}", kind(&other)),
            }
        }
        Format::Jsonl | Format::Auto => input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("invalid JSON on line {}", idx + 1))
            })
            .collect(),
    }
}

fn write_documents<W: Write>(out: &mut W, docs: &[&Json], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, docs)?;
            writeln!(out)?;
        }
        Format::Jsonl | Format::Auto => {
            for doc in docs {
                serde_json::to_writer(&mut *out, doc)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_arrays_and_lines() {
        assert_eq!(Format::detect("  [1, 2]"), Format::Json);
        assert_eq!(Format::detect("{\"a\": 1}\n{\"a\": 2}"), Format::Jsonl);
        assert_eq!(Format::detect(""), Format::Jsonl);
    }

    #[test]
    fn jsonl_skips_blank_lines() {
        let input = "{\"a\": 1}\n\n  \n{\"a\": 2}\n";
        let docs = parse_documents(input, Format::Jsonl).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn jsonl_reports_line_numbers() {
        let input = "{\"a\": 1}\n{oops";
        let err = parse_documents(input, Format::Jsonl).unwrap_err();
        assert_eq!(err.to_string(), "invalid JSON on line 2");
    }

    #[test]
    fn json_format_requires_an_array() {
        let err = parse_documents("{\"a\": 1}", Format::Json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected an array of documents, found an object"
        );
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "debug");
        assert_eq!(log_level(2), "trace");
        assert_eq!(log_level(9), "trace");
    }
}
