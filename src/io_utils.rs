//! File reading for uploaded equipment tables.
//!
//! Every upload flows through [`read_raw_table()`], which:
//!
//! - resolves the delimiter from the file extension (`.tsv` → tab, anything
//!   else → comma) unless one is given explicitly,
//! - decodes bytes with `encoding_rs`, defaulting to UTF-8,
//! - loads the header row and every data row into a [`RawTable`] in memory.
//!
//! The `-` path reads from stdin. A row with fewer fields than the header is
//! kept and its missing cells read as empty; a row with more fields, or any
//! other parse or decode failure, is reported as [`IngestError::FileUnreadable`].

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::IngestError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Headers and rows exactly as parsed from an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text at `row`/`column`; cells past the end of a short row read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, IngestError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| {
            IngestError::UnknownEncoding {
                label: value.to_string(),
            }
        }),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(format!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, String> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Parses a complete table from `reader`; `source` names it in error messages.
pub fn read_table_from<R>(
    reader: R,
    source: &str,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, IngestError>
where
    R: Read,
{
    let mut reader = open_csv_reader(reader, delimiter);
    let header_record = reader
        .byte_headers()
        .map_err(|err| IngestError::unreadable(source, err))?
        .clone();
    let mut headers = decode_record(&header_record, encoding)
        .map_err(|reason| IngestError::unreadable(source, format!("Header row: {reason}")))?;
    if let Some(first) = headers.first_mut()
        && let Some(stripped) = first.strip_prefix('\u{feff}')
    {
        *first = stripped.to_string();
    }
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::unreadable(source, "No header row found"));
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record
            .map_err(|err| IngestError::unreadable(source, format!("Row {}: {err}", row_idx + 2)))?;
        // Short rows are padded on access; extra fields have no header to land under.
        if record.len() > headers.len() {
            return Err(IngestError::unreadable(
                source,
                format!(
                    "Row {}: expected {} fields, found {}",
                    row_idx + 2,
                    headers.len(),
                    record.len()
                ),
            ));
        }
        let decoded = decode_record(&record, encoding)
            .map_err(|reason| IngestError::unreadable(source, format!("Row {}: {reason}", row_idx + 2)))?;
        rows.push(decoded);
    }
    Ok(RawTable::new(headers, rows))
}

pub fn read_raw_table(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<RawTable, IngestError> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let source = path.display().to_string();
    if is_dash(path) {
        return read_table_from(std::io::stdin().lock(), &source, delimiter, encoding);
    }
    let file = File::open(path).map_err(|err| IngestError::unreadable(source.clone(), err))?;
    read_table_from(BufReader::new(file), &source, delimiter, encoding)
}
