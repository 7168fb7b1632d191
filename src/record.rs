//! Persistable dataset records and the bounded row samples they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    normalize::{CanonicalRow, CanonicalTable},
    summary::Summary,
};

/// Rows kept with a stored dataset.
pub const PERSISTED_SAMPLE_ROWS: usize = 100;
/// Rows returned to the uploader and exposed through history.
pub const RESPONSE_SAMPLE_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: Uuid,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub summary: Summary,
    pub sample_rows: Vec<CanonicalRow>,
}

impl DatasetRecord {
    /// Prefix of the stored sample, at most `limit` rows.
    pub fn sample_prefix(&self, limit: usize) -> &[CanonicalRow] {
        &self.sample_rows[..self.sample_rows.len().min(limit)]
    }
}

/// What a successful upload hands back: the stored record plus the response sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub record: DatasetRecord,
    pub rows: Vec<CanonicalRow>,
}

impl IngestOutcome {
    pub fn summary(&self) -> &Summary {
        &self.record.summary
    }
}

pub fn build_record(
    name: &str,
    table: &CanonicalTable,
    summary: Summary,
    uploaded_at: DateTime<Utc>,
) -> IngestOutcome {
    let record = DatasetRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        uploaded_at,
        summary,
        sample_rows: table.head(PERSISTED_SAMPLE_ROWS),
    };
    let rows = record.sample_prefix(RESPONSE_SAMPLE_ROWS).to_vec();
    IngestOutcome { record, rows }
}
