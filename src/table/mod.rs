//! Column-oriented tables of JSON cells.
//!
//! A [`Table`] is built from API [`Record`]s (one JSON object per row) or read
//! from a CSV file. Cells are `serde_json::Value`s so list-valued fields stay
//! lists until they are flattened or resolved; `Value::Null` is the null
//! sentinel throughout the crate.

mod csv;
pub mod literal;

use serde_json::{Map, Value};

use crate::error_handling::TableError;

pub use self::csv::{read_csv, write_csv};

/// One API result item: field name to scalar, list or null.
pub type Record = Map<String, Value>;

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// One cell per row
    pub cells: Vec<Value>,
}

/// A named table with a stable, ordered column set.
///
/// All columns hold exactly `n_rows()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Builds a table from records.
    ///
    /// Columns appear in the order fields are first seen across the records;
    /// a record missing a field gets a null cell in that column.
    pub fn from_records(name: impl Into<String>, records: &[Record]) -> Self {
        let mut names: Vec<&String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !names.contains(&key) {
                    names.push(key);
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|column| Column {
                name: column.clone(),
                cells: records
                    .iter()
                    .map(|record| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect(),
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows: records.len(),
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by name, failing with `TableError::UnknownColumn`.
    pub fn try_column(&self, name: &str) -> Result<&Column, TableError> {
        self.column(name).ok_or_else(|| self.unknown_column(name))
    }

    /// Mutable column lookup, failing with `TableError::UnknownColumn`.
    pub fn try_column_mut(&mut self, name: &str) -> Result<&mut Column, TableError> {
        let err = self.unknown_column(name);
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or(err)
    }

    fn unknown_column(&self, name: &str) -> TableError {
        TableError::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        }
    }

    /// Replaces the cells of `name`, or appends it as a new last column.
    ///
    /// # Errors
    ///
    /// Returns `TableError::RowCount` if `cells` does not hold one cell per
    /// row. A table without columns adopts the length of its first column.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        cells: Vec<Value>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = cells.len();
        } else if cells.len() != self.rows {
            return Err(TableError::RowCount {
                column: name,
                expected: self.rows,
                actual: cells.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.cells = cells,
            None => self.columns.push(Column { name, cells }),
        }
        Ok(())
    }

    /// Renames a column in place.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> Result<(), TableError> {
        self.try_column_mut(from)?.name = to.into();
        Ok(())
    }

    /// Returns a table holding only `names`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `TableError::UnknownColumn` for the first missing name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let columns = names
            .iter()
            .map(|name| self.try_column(name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table {
            name: self.name.clone(),
            columns,
            rows: self.rows,
        })
    }

    /// Returns the cell at (`row`, `column`), if both exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column)?.cells.get(row)
    }

    /// Converts the table back into one record per row.
    pub fn to_records(&self) -> Vec<Record> {
        (0..self.rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| {
                        let cell = c.cells.get(row).cloned().unwrap_or(Value::Null);
                        (c.name.clone(), cell)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Compares two cells, treating numbers by numeric value (`1 == 1.0`).
pub fn cells_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Renders a cell as a label for derived column names.
///
/// Strings are used as-is, integral floats lose their fraction, `null` is
/// `None`.
pub fn cell_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => literal::to_literal(other),
    }
}
