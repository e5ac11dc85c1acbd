use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::store::DEFAULT_BATCH_SIZE;

#[derive(Debug, Parser)]
#[command(author, version, about = "Load nested CSV records into a users table", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse, validate and insert a CSV file, then report the age distribution
    Upload(UploadArgs),
    /// List every stored user ordered by id
    Users(StoreArgs),
    /// Report the age distribution of stored users
    Distribution(StoreArgs),
    /// Remove all users and restart id numbering
    Clear(StoreArgs),
    /// Write a synthetic CSV file for load testing
    Generate(GenerateArgs),
    /// Report that the tool is available
    Health(OutputArgs),
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Emit a JSON response body instead of a console report
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// SQLite database holding the users table
    #[arg(long, env = "CSV_INGEST_DATABASE", default_value = "users.db")]
    pub database: PathBuf,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// CSV file to ingest ('-' reads stdin)
    #[arg(
        short = 'i',
        long = "input",
        env = "CSV_FILE_PATH",
        default_value = "./uploads/users.csv"
    )]
    pub input: PathBuf,
    /// Rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Number of records to generate (1 to 1,000,000)
    #[arg(short = 'n', long)]
    pub count: usize,
    /// Destination file (defaults to uploads/bulk_<count>_<timestamp>.csv)
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
            if !first.is_ascii() || first == '"' {
                return Err("Delimiter must be an ASCII character other than '\"'".to_string());
            }
            Ok(first as u8)
        }
    }
}
