//! Plain-text equipment report for the most recent dataset.
//!
//! Section order is fixed: title, user and date lines, summary statistics,
//! equipment distribution, footer. Long distributions spill over onto
//! further pages; pages are separated by a form feed and each ends with a
//! `Page i of n` marker.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::{
    error::IngestError,
    store::{self, DatasetStore},
    summary::Summary,
};

pub const REPORT_TITLE: &str = "Equipment Analysis Report";
pub const REPORT_FOOTER: &str = "Generated by Chem Equipment Analyzer";
/// Content lines per page, excluding the page marker.
pub const PAGE_LINES: usize = 50;
const PAGE_BREAK: char = '\u{000C}';

/// The already-authenticated caller a report is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

pub fn display_label(label: &str) -> &str {
    if label.is_empty() { "<empty>" } else { label }
}

fn report_lines(summary: &Summary, uploaded_at: DateTime<Utc>, identity: &Identity) -> Vec<String> {
    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!("User: {}", identity.username),
        format!("Date: {}", uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "Summary Statistics".to_string(),
        format!("  Total Records: {}", summary.total_records),
        format!("  Avg Flowrate: {:.2}", summary.avg_flowrate),
        format!("  Avg Pressure: {:.2}", summary.avg_pressure),
        format!("  Avg Temperature: {:.2}", summary.avg_temperature),
        String::new(),
        "Equipment Distribution".to_string(),
    ];
    lines.extend(
        summary
            .type_distribution
            .entries()
            .iter()
            .map(|(label, count)| format!("    {}: {count}", display_label(label))),
    );
    lines.push(String::new());
    lines.push(REPORT_FOOTER.to_string());
    lines
}

pub fn render_report(summary: &Summary, uploaded_at: DateTime<Utc>, identity: &Identity) -> String {
    let lines = report_lines(summary, uploaded_at, identity);
    let chunks = lines.chunks(PAGE_LINES).collect_vec();
    let page_count = chunks.len();
    let mut output = String::new();
    for (idx, page) in chunks.into_iter().enumerate() {
        if idx > 0 {
            output.push(PAGE_BREAK);
        }
        for line in page {
            let _ = writeln!(output, "{line}");
        }
        let _ = writeln!(output, "\nPage {} of {page_count}", idx + 1);
    }
    output
}

/// Renders the report for the newest stored dataset.
pub fn generate_report(store: &dyn DatasetStore, identity: &Identity) -> Result<String, IngestError> {
    let record = store::latest_or_missing(store)?;
    Ok(render_report(&record.summary, record.uploaded_at, identity))
}
