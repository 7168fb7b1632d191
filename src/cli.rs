use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_STORE_DIR: &str = ".equipment-analyzer";

#[derive(Debug, Parser)]
#[command(author, version, about = "Summarize chemical-process equipment files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest an equipment CSV file, store its summary, and print the result
    Upload(UploadArgs),
    /// List the most recently uploaded datasets
    History(HistoryArgs),
    /// Write a report for the most recent dataset
    Report(ReportArgs),
    /// Show the canonical fields and the header spellings accepted for each
    Columns,
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Directory holding stored dataset records
    #[arg(long, env = "EQUIPMENT_ANALYZER_STORE", default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Equipment CSV file to ingest ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub store: StoreArgs,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Print the stored record and response rows as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Print history entries as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    /// Name of the user the report is generated for
    #[arg(short, long, env = "EQUIPMENT_ANALYZER_USER")]
    pub user: String,
    /// Output file for the report (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_symbols() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("#"), Ok(b'#'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
