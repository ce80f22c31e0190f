use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_MAX_TRACKED_VALUES, DEFAULT_NULL_MARKER};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Infer MySQL tables from CSV files and generate LOAD DATA scripts",
    long_about = None
)]
pub struct Cli {
    /// Report progress: row counts, uniqueness losses and timings
    #[arg(short, long, global = true)]
    pub progress: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write CREATE TABLE and LOAD DATA statements for each input file
    Generate(GenerateArgs),
    /// Print the inferred column types without generating SQL
    Inspect(InspectArgs),
}

/// A separator, quote or escape character. Empty or `none` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectChar(pub Option<u8>);

#[derive(Debug, Args)]
pub struct InferenceArgs {
    /// Field separator (supports ',', 'tab', ';', '|', or any ASCII character)
    #[arg(short = 'c', long, value_parser = parse_dialect_char, default_value = ",")]
    pub separator: DialectChar,
    /// Quote character enclosing fields
    #[arg(short, long, value_parser = parse_dialect_char, default_value = "\"")]
    pub quote: DialectChar,
    /// Escape character inside quoted fields
    #[arg(short, long, value_parser = parse_dialect_char, default_value = "\\")]
    pub escape: DialectChar,
    /// Treat the first line as data and name columns V0, V1, ...
    #[arg(short, long)]
    pub generated_names: bool,
    /// Size text columns for UTF-8 and declare the table CHARACTER SET UTF8
    #[arg(short, long)]
    pub utf8: bool,
    /// Detect columns with distinct values and declare them UNIQUE KEY
    #[arg(short = 'k', long)]
    pub unique_keys: bool,
    /// Distinct non-integer values tracked per column before key detection gives up
    #[arg(short, long, default_value_t = DEFAULT_MAX_TRACKED_VALUES)]
    pub max_tracked_values: usize,
    /// Treat empty fields as values instead of NULL
    #[arg(short, long)]
    pub blanks_not_null: bool,
    /// Treat integers with leading zeros (e.g. 007) as text
    #[arg(short = 'z', long)]
    pub no_leading_zero_integers: bool,
    /// Token that stands for NULL in the input
    #[arg(long, default_value = DEFAULT_NULL_MARKER)]
    pub null_marker: String,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Input CSV files; each becomes one table
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Output script (defaults to mysql_load.sql beside the first input; '-' for stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Character encoding of the generated script (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Number of files scanned in parallel
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,
    #[command(flatten)]
    pub inference: InferenceArgs,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Input CSV files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Emit a JSON report instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub inference: InferenceArgs,
}

pub fn parse_dialect_char(value: &str) -> Result<DialectChar, String> {
    match value {
        "" | "none" => Ok(DialectChar(None)),
        "tab" | "\t" => Ok(DialectChar(Some(b'\t'))),
        "comma" | "," => Ok(DialectChar(Some(b','))),
        "|" | "pipe" => Ok(DialectChar(Some(b'|'))),
        ";" | "semicolon" => Ok(DialectChar(Some(b';'))),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Character cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Expected a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Character must be ASCII".to_string());
            }
            Ok(DialectChar(Some(first as u8)))
        }
    }
}
