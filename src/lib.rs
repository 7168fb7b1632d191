pub mod cli;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod normalize;
pub mod record;
pub mod report;
pub mod schema;
pub mod store;
pub mod summary;
pub mod table;

use std::{env, fs, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    report::Identity,
    schema::CanonicalField,
    store::{DatasetStore, JsonStore},
};

pub use crate::{
    error::IngestError,
    ingest::{ingest, ingest_at, ingest_path},
    record::{DatasetRecord, IngestOutcome},
    summary::Summary,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("equipment_analyzer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Upload(args) => handle_upload(&args),
        Commands::History(args) => handle_history(&args),
        Commands::Report(args) => handle_report(&args),
        Commands::Columns => {
            handle_columns();
            Ok(())
        }
    }
}

fn handle_upload(args: &cli::UploadArgs) -> Result<()> {
    info!(
        "Uploading '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(io_utils::resolve_input_delimiter(&args.input, args.delimiter))
    );
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let outcome = ingest::ingest_path(&args.input, args.delimiter, encoding)
        .with_context(|| format!("Ingesting {:?}", args.input))?;

    let store = JsonStore::new(&args.store.store);
    let id = store
        .save(&outcome.record)
        .with_context(|| format!("Saving dataset to {:?}", store.root()))?;
    info!("Stored dataset {id} in {:?}", store.root());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    table::print_table(&["metric", "value"], &table::summary_rows(outcome.summary()));
    println!();
    table::print_table(&table::sample_headers(), &table::sample_rows(&outcome.rows));
    Ok(())
}

fn handle_history(args: &cli::HistoryArgs) -> Result<()> {
    let store = JsonStore::new(&args.store.store);
    let entries = store::history(&store)
        .with_context(|| format!("Loading history from {:?}", store.root()))?;
    debug!("History returned {} record(s)", entries.len());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    let headers = [
        "id",
        "name",
        "uploaded_at",
        "total_records",
        "avg_flowrate",
        "avg_pressure",
        "avg_temperature",
    ];
    table::print_table(&headers, &table::history_rows(&entries));
    info!("Listed {} dataset(s) from {:?}", entries.len(), store.root());
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let store = JsonStore::new(&args.store.store);
    let identity = Identity::new(args.user.trim());
    let rendered = report::generate_report(&store, &identity)?;
    match &args.output {
        Some(path) if !io_utils::is_dash(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Writing report to {path:?}"))?;
            info!("Report for '{}' written to {:?}", identity.username, path);
        }
        _ => print!("{rendered}"),
    }
    Ok(())
}

fn handle_columns() {
    let rows = CanonicalField::ALL
        .iter()
        .map(|field| vec![field.to_string(), field.aliases().join(", ")])
        .collect::<Vec<_>>();
    table::print_table(&["field", "accepted headers"], &rows);
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
