// Shared test helpers for table fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use gamedata_etl::Record;
use serde_json::Value;

/// Writes `contents` to `{dir}/{name}_data.csv` and returns the path.
#[allow(dead_code)] // Used by other test files
pub fn write_table_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(format!("{}_data.csv", name));
    fs::write(&path, contents).expect("Failed to write CSV fixture");
    path
}

/// Converts a JSON array of objects into records.
#[allow(dead_code)] // Used by other test files
pub fn records(rows: Value) -> Vec<Record> {
    rows.as_array()
        .expect("fixture must be an array")
        .iter()
        .map(|row| row.as_object().cloned().expect("fixture rows must be objects"))
        .collect()
}
