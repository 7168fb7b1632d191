use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use equipment_analyzer::{ingest, ingest_path, io_utils};
use tempfile::TempDir;

fn generate_equipment(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("equipment.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "Device,Category,Flow Rate,Press,Temp C,Notes").expect("header");
    for i in 0..rows {
        let kind = match i % 4 {
            0 => "Pump",
            1 => "Valve",
            2 => "Compressor",
            _ => "HeatExchanger",
        };
        let flow = if i % 17 == 0 {
            "n/a".to_string()
        } else {
            format!("{:.2}", 50.0 + (i % 90) as f64 * 1.5)
        };
        writeln!(
            file,
            "Unit-{i},{kind},{flow},{},{},inspected",
            3 + i % 12,
            80 + i % 40
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_ingest(c: &mut Criterion) {
    let (_dir, path) = generate_equipment(500);
    let raw = io_utils::read_raw_table(&path, None, UTF_8).expect("read table");

    c.bench_function("ingest_in_memory_500", |b| {
        b.iter(|| ingest(&raw, "equipment.csv").expect("ingest"))
    });
    c.bench_function("ingest_from_file_500", |b| {
        b.iter(|| ingest_path(&path, None, UTF_8).expect("ingest"))
    });
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
