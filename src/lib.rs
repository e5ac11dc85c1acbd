pub mod cli;
pub mod data;
pub mod distribution;
pub mod error;
pub mod generate;
pub mod io_utils;
pub mod mapper;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod store;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde_json::json;

use crate::{
    cli::{Cli, Commands},
    error::IngestError,
    pipeline::IngestOptions,
    store::UserStore,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Upload(args) => handle_upload(&args),
        Commands::Users(args) => handle_users(&args),
        Commands::Distribution(args) => handle_distribution(&args),
        Commands::Clear(args) => handle_clear(&args),
        Commands::Generate(args) => handle_generate(&args),
        Commands::Health(args) => handle_health(&args),
    }
}

fn open_store(args: &cli::StoreArgs) -> Result<UserStore> {
    UserStore::open(&args.database)
        .with_context(|| format!("Opening database {:?}", args.database))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Serializing response")?
    );
    Ok(())
}

/// In JSON mode a failure is still reported as a response body before the
/// error propagates to the exit status.
fn respond_with_error<T>(json: bool, result: Result<T>) -> Result<T> {
    if json && let Err(err) = &result {
        print_json(&json!({ "success": false, "error": format!("{err:#}") }))?;
    }
    result
}

fn run_upload(args: &cli::UploadArgs) -> Result<pipeline::UploadSummary> {
    let options = IngestOptions {
        delimiter: args.delimiter.unwrap_or(parser::DEFAULT_DELIMITER),
        batch_size: args.batch_size,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    info!(
        "Uploading '{}' with delimiter '{}' in batches of {}",
        args.input.display(),
        printable_delimiter(options.delimiter),
        options.batch_size
    );
    let mut store = open_store(&args.store)?;
    pipeline::upload(&mut store, &args.input, &options)
        .with_context(|| format!("Processing {:?}", args.input))
}

fn handle_upload(args: &cli::UploadArgs) -> Result<()> {
    let json = args.store.output.json;
    let result = run_upload(args);
    let summary = respond_with_error(json, result)?;

    if json {
        return print_json(&json!({
            "success": true,
            "message": "CSV processed successfully",
            "recordsProcessed": summary.records_processed,
            "skippedRows": summary.skipped_rows,
            "ageDistribution": summary.age_distribution.as_ref().map(|d| &d.percentages),
        }));
    }
    println!(
        "Inserted {} record(s) ({} skipped)",
        summary.records_processed, summary.skipped_rows
    );
    match &summary.age_distribution {
        Some(distribution) => print!("{}", report::render_distribution(distribution)),
        None => println!("No users found"),
    }
    Ok(())
}

fn handle_users(args: &cli::StoreArgs) -> Result<()> {
    let result = open_store(args).and_then(|store| {
        pipeline::list_users(&store).context("Listing users")
    });
    let users = respond_with_error(args.output.json, result)?;
    if args.output.json {
        return print_json(&json!({
            "success": true,
            "count": users.len(),
            "users": users,
        }));
    }
    print!("{}", report::render_users(&users));
    info!("Listed {} user(s)", users.len());
    Ok(())
}

fn handle_distribution(args: &cli::StoreArgs) -> Result<()> {
    let store = respond_with_error(args.output.json, open_store(args))?;
    match pipeline::age_distribution(&store) {
        Ok(distribution) => {
            if args.output.json {
                let mut body = serde_json::to_value(&distribution)?;
                body["success"] = json!(true);
                print_json(&body)
            } else {
                print!("{}", report::render_distribution(&distribution));
                Ok(())
            }
        }
        Err(IngestError::NoData) => {
            if args.output.json {
                print_json(&json!({ "success": false, "message": "No users found" }))
            } else {
                println!("No users found");
                Ok(())
            }
        }
        Err(err) => respond_with_error(
            args.output.json,
            Err(anyhow::Error::new(err).context("Calculating age distribution")),
        ),
    }
}

fn handle_clear(args: &cli::StoreArgs) -> Result<()> {
    let result = open_store(args).and_then(|mut store| {
        pipeline::clear_users(&mut store).context("Clearing users")
    });
    respond_with_error(args.output.json, result)?;
    if args.output.json {
        return print_json(&json!({
            "success": true,
            "message": "All users cleared successfully",
        }));
    }
    println!("All users cleared successfully");
    Ok(())
}

fn handle_generate(args: &cli::GenerateArgs) -> Result<()> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| generate::default_output_path(args.count));
    let written = generate::generate_csv(&path, args.count)
        .with_context(|| format!("Generating {path:?}"))?;
    println!("Generated {written} record(s) at {}", path.display());
    Ok(())
}

fn handle_health(args: &cli::OutputArgs) -> Result<()> {
    if args.json {
        return print_json(&json!({ "status": "OK", "message": "Server is running" }));
    }
    println!("OK");
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
