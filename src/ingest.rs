//! The ingestion pipeline: resolve, validate, normalize, aggregate, build.
//!
//! An ingestion either completes and yields an [`IngestOutcome`] or fails
//! with no record produced. Storing the record is left to the caller, so a
//! failed upload can never leave anything behind in a [`crate::store::DatasetStore`].

use std::{fmt, path::Path};

use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{
    error::IngestError,
    io_utils::{self, RawTable},
    normalize::normalize_rows,
    record::{IngestOutcome, build_record},
    schema::{CanonicalField, resolve_columns},
    summary::summarize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Resolving,
    Invalid,
    Resolved,
    Normalizing,
    Aggregating,
    Built,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IngestStage::Received => "received",
            IngestStage::Resolving => "resolving",
            IngestStage::Invalid => "invalid",
            IngestStage::Resolved => "resolved",
            IngestStage::Normalizing => "normalizing",
            IngestStage::Aggregating => "aggregating",
            IngestStage::Built => "built",
        };
        f.write_str(label)
    }
}

fn enter(name: &str, stage: IngestStage) {
    debug!("Ingestion of '{name}' {stage}");
}

pub fn ingest(raw: &RawTable, name: &str) -> Result<IngestOutcome, IngestError> {
    ingest_at(raw, name, Utc::now())
}

pub fn ingest_at(
    raw: &RawTable,
    name: &str,
    uploaded_at: DateTime<Utc>,
) -> Result<IngestOutcome, IngestError> {
    enter(name, IngestStage::Received);

    enter(name, IngestStage::Resolving);
    let mapping = resolve_columns(&raw.headers);
    let columns = match mapping.validate() {
        Ok(columns) => columns,
        Err(err) => {
            enter(name, IngestStage::Invalid);
            return Err(err);
        }
    };
    enter(name, IngestStage::Resolved);
    for field in CanonicalField::ALL {
        debug!("'{name}': {field} <- '{}'", columns.header_of(field));
    }

    enter(name, IngestStage::Normalizing);
    let table = normalize_rows(raw, &columns);

    enter(name, IngestStage::Aggregating);
    if table.is_empty() {
        warn!("'{name}' contains no data rows; averages are reported as 0.0");
    }
    let summary = summarize(&table);

    let outcome = build_record(name, &table, summary, uploaded_at);
    enter(name, IngestStage::Built);
    info!(
        "Ingested '{}' with {} record(s) across {} equipment type(s)",
        name,
        outcome.summary().total_records,
        outcome.summary().type_distribution.len()
    );
    Ok(outcome)
}

/// Reads `path` and ingests it under its file name.
pub fn ingest_path(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<IngestOutcome, IngestError> {
    let raw = io_utils::read_raw_table(path, delimiter, encoding)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ingest(&raw, &name)
}
