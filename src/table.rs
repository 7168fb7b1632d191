//! Aligned console tables for summaries, samples, and history listings.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    normalize::CanonicalRow,
    report::display_label,
    schema::CanonicalField,
    store::HistoryEntry,
    summary::Summary,
};

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", separator.join("  "));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", sanitize_cell(value), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

pub fn summary_rows(summary: &Summary) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "total_records".to_string(),
        summary.total_records.to_string(),
    ]];
    for field in CanonicalField::ALL {
        if let Some(mean) = summary.average(field) {
            rows.push(vec![format!("avg_{field}"), format!("{mean:.2}")]);
        }
    }
    for (label, count) in summary.type_distribution.entries() {
        rows.push(vec![
            format!("type: {}", display_label(label)),
            count.to_string(),
        ]);
    }
    rows
}

pub fn sample_headers() -> Vec<&'static str> {
    CanonicalField::ALL.iter().map(|f| f.as_str()).collect()
}

pub fn sample_rows(rows: &[CanonicalRow]) -> Vec<Vec<String>> {
    rows.iter().map(CanonicalRow::to_cells).collect()
}

pub fn history_rows(entries: &[HistoryEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            vec![
                entry.id.to_string(),
                entry.name.clone(),
                entry.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                entry.summary.total_records.to_string(),
                format!("{:.2}", entry.summary.avg_flowrate),
                format!("{:.2}", entry.summary.avg_pressure),
                format!("{:.2}", entry.summary.avg_temperature),
            ]
        })
        .collect()
}
