//! Dataset persistence and the recent-history projection.
//!
//! [`DatasetStore`] is the seam between ingestion and storage. Two stores
//! ship with the crate:
//!
//! - [`JsonStore`] keeps one pretty-printed JSON file per record in a
//!   directory. Files are written under a temporary name and renamed into
//!   place, so a reader sees a record either whole or not at all. A `.json`
//!   file that does not load as a record is logged and skipped.
//! - [`MemoryStore`] keeps records in a mutex-guarded vector.
//!
//! Records are never updated or evicted.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{IngestError, StoreError},
    normalize::CanonicalRow,
    record::{DatasetRecord, RESPONSE_SAMPLE_ROWS},
    summary::Summary,
};

/// Number of records shown by [`history()`].
pub const HISTORY_LIMIT: usize = 5;

pub trait DatasetStore: Send + Sync {
    fn save(&self, record: &DatasetRecord) -> Result<Uuid, StoreError>;

    /// Up to `limit` records, newest `uploaded_at` first.
    fn list_recent(&self, limit: usize) -> Result<Vec<DatasetRecord>, StoreError>;

    fn latest(&self) -> Result<Option<DatasetRecord>, StoreError> {
        Ok(self.list_recent(1)?.into_iter().next())
    }
}

/// A stored dataset as exposed through history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub summary: Summary,
    pub rows: Vec<CanonicalRow>,
}

impl From<DatasetRecord> for HistoryEntry {
    fn from(record: DatasetRecord) -> Self {
        let rows = record.sample_prefix(RESPONSE_SAMPLE_ROWS).to_vec();
        Self {
            id: record.id,
            name: record.name,
            uploaded_at: record.uploaded_at,
            summary: record.summary,
            rows,
        }
    }
}

pub fn history(store: &dyn DatasetStore) -> Result<Vec<HistoryEntry>, IngestError> {
    let records = store.list_recent(HISTORY_LIMIT)?;
    Ok(records.into_iter().map(HistoryEntry::from).collect())
}

pub fn latest_or_missing(store: &dyn DatasetStore) -> Result<DatasetRecord, IngestError> {
    store.latest()?.ok_or(IngestError::NoPriorDataset)
}

fn newest_first(records: &mut [DatasetRecord]) {
    records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn load(path: &Path) -> Result<DatasetRecord, StoreError> {
        let file = File::open(path).map_err(|err| Self::io_error(path, err))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

impl DatasetStore for JsonStore {
    fn save(&self, record: &DatasetRecord) -> Result<Uuid, StoreError> {
        fs::create_dir_all(&self.root).map_err(|err| Self::io_error(&self.root, err))?;
        let target = self.record_path(&record.id);
        let staging = self.root.join(format!(".{}.json.tmp", record.id));
        let file = File::create(&staging).map_err(|err| Self::io_error(&staging, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|source| StoreError::Json {
            path: staging.display().to_string(),
            source,
        })?;
        writer.flush().map_err(|err| Self::io_error(&staging, err))?;
        drop(writer);
        fs::rename(&staging, &target).map_err(|err| Self::io_error(&target, err))?;
        debug!("Saved dataset {} to {:?}", record.id, target);
        Ok(record.id)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<DatasetRecord>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Self::io_error(&self.root, err)),
        };
        let mut records = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| Self::io_error(&self.root, err))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::load(&path) {
                Ok(record) => records.push(record),
                Err(err) => warn!("Skipping unreadable dataset record: {err}"),
            }
        }
        // Directory order is arbitrary; fall back to id for equal timestamps.
        records.sort_by(|a, b| a.id.cmp(&b.id));
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DatasetRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl DatasetStore for MemoryStore {
    fn save(&self, record: &DatasetRecord) -> Result<Uuid, StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.push(record.clone());
        Ok(record.id)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<DatasetRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        // Later saves win ties on equal timestamps.
        let mut recent: Vec<DatasetRecord> = records.iter().rev().cloned().collect();
        newest_first(&mut recent);
        recent.truncate(limit);
        Ok(recent)
    }
}
