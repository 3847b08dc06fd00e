//! CSV persistence for tables.
//!
//! Cells are written in literal form (lists as `[1, 2]`, nulls as empty
//! fields). Reading infers integers and floats per cell and leaves every
//! other field as text; list columns are parsed on demand by the rewriter.

use std::path::Path;

use ::csv::{ReaderBuilder, Writer};
use serde_json::{Number, Value};

use super::literal::to_literal;
use super::Table;
use crate::error_handling::TableError;

/// Reads a CSV file with a header row into a table called `name`.
///
/// # Errors
///
/// Returns `TableError::Csv` if the file cannot be opened or a row has a
/// different number of fields than the header.
pub fn read_csv(path: &Path, name: &str) -> Result<Table, TableError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    let mut rows = 0usize;
    for result in reader.records() {
        let row = result?;
        for (cells, field) in columns.iter_mut().zip(row.iter()) {
            cells.push(infer_cell(field));
        }
        rows += 1;
    }

    let mut table = Table::new(name);
    for (header, cells) in headers.into_iter().zip(columns) {
        table.set_column(header, cells)?;
    }
    log::debug!(
        "Read {} rows x {} columns from {}",
        rows,
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Writes a table to `path` with a header row.
///
/// # Errors
///
/// Returns `TableError::Csv` if the file cannot be created or written.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), TableError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in 0..table.n_rows() {
        let fields = table.columns().iter().map(|column| {
            column
                .cells
                .get(row)
                .map(to_literal)
                .unwrap_or_default()
        });
        writer.write_record(fields)?;
    }
    writer.flush()?;
    log::debug!(
        "Wrote {} rows of '{}' to {}",
        table.n_rows(),
        table.name(),
        path.display()
    );
    Ok(())
}

/// Integer, then float, then text. Empty fields are null.
fn infer_cell(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = field.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = field.parse::<f64>() {
        if float.is_nan() {
            return Value::Null;
        }
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(field.to_string())
}
