#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const SCENARIO_CSV: &str = "Machine,Category,Flow,Press,Temp\n\
Pump1,Pump,10,5,20\n\
Valve1,Valve,30,15,40\n";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory used as the dataset store for CLI runs.
    pub fn store_dir(&self) -> PathBuf {
        self.temp_dir.path().join("store")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds an equipment CSV with `rows` data rows cycling through three types.
pub fn equipment_csv(rows: usize) -> String {
    let mut out = String::from("Equipment Name,Type,Flowrate,Pressure,Temperature\n");
    for idx in 0..rows {
        let kind = match idx % 3 {
            0 => "Pump",
            1 => "Valve",
            _ => "Reactor",
        };
        out.push_str(&format!("Unit-{idx},{kind},{},{},{}\n", idx % 10, idx % 7, 20 + idx % 5));
    }
    out
}
