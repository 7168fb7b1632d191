//! Error kinds surfaced by ingestion, persistence, and reporting.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload could not be parsed into a header row plus data rows.
    #[error("Unable to read {path}: {reason}")]
    FileUnreadable { path: String, reason: String },
    /// The requested input encoding label is not recognised by `encoding_rs`.
    #[error("Unknown encoding '{label}'")]
    UnknownEncoding { label: String },
    /// One or more canonical fields found no matching header.
    #[error(
        "Missing required fields: {} (found columns: {})",
        .missing.join(", "),
        .found.join(", ")
    )]
    SchemaIncomplete {
        missing: Vec<String>,
        found: Vec<String>,
    },
    #[error("No data available: upload a dataset first")]
    NoPriorDataset,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl IngestError {
    pub(crate) fn unreadable(path: impl Into<String>, reason: impl ToString) -> Self {
        IngestError::FileUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Dataset store I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Dataset record {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Dataset store lock was poisoned")]
    Poisoned,
}
