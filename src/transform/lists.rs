//! Helpers for list-valued columns.
//!
//! Fields such as `genres` or `platforms` hold lists of ids. These helpers
//! clean such columns and turn them into long tables and frequency tables
//! that can be joined or charted elsewhere.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::error_handling::TableError;
use crate::table::literal::to_literal;
use crate::table::Table;

/// Removes null elements from every list cell of `column`.
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if the column is missing.
pub fn strip_nulls_in_lists(table: &mut Table, column: &str) -> Result<(), TableError> {
    for cell in table.try_column_mut(column)?.cells.iter_mut() {
        if let Value::Array(items) = cell {
            items.retain(|item| !item.is_null());
        }
    }
    Ok(())
}

/// Replaces every empty list cell of `column` with null.
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if the column is missing.
pub fn empty_lists_to_null(table: &mut Table, column: &str) -> Result<(), TableError> {
    for cell in table.try_column_mut(column)?.cells.iter_mut() {
        if matches!(cell, Value::Array(items) if items.is_empty()) {
            *cell = Value::Null;
        }
    }
    Ok(())
}

/// Flattens the list cells of `column` into a one-column table.
///
/// Elements keep their order; cells that are not lists are skipped.
pub fn unpack_lists(table: &Table, column: &str) -> Result<Table, TableError> {
    let cells: Vec<Value> = table
        .try_column(column)?
        .cells
        .iter()
        .filter_map(Value::as_array)
        .flatten()
        .cloned()
        .collect();

    let mut unpacked = Table::new(column);
    unpacked.set_column(column, cells)?;
    Ok(unpacked)
}

/// Grouping key for [`value_counts`]. Numbers group by numeric value.
#[derive(Debug, Clone)]
enum CountKey {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CountKey {
    fn from_cell(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(CountKey::Bool(*b)),
            Value::Number(n) => n.as_f64().map(CountKey::Number),
            Value::String(s) => Some(CountKey::Text(s.clone())),
            nested => Some(CountKey::Text(to_literal(nested))),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CountKey::Bool(_) => 0,
            CountKey::Number(_) => 1,
            CountKey::Text(_) => 2,
        }
    }
}

impl Ord for CountKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CountKey::Bool(a), CountKey::Bool(b)) => a.cmp(b),
            (CountKey::Number(a), CountKey::Number(b)) => a.total_cmp(b),
            (CountKey::Text(a), CountKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CountKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CountKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CountKey {}

fn count_column(table: &Table, column: &str) -> Result<BTreeMap<CountKey, (Value, u64)>, TableError> {
    let mut counts: BTreeMap<CountKey, (Value, u64)> = BTreeMap::new();
    for cell in &table.try_column(column)?.cells {
        if let Some(key) = CountKey::from_cell(cell) {
            counts.entry(key).or_insert_with(|| (cell.clone(), 0)).1 += 1;
        }
    }
    Ok(counts)
}

/// Name of the count column produced for `column`.
pub fn count_column_name(column: &str) -> String {
    format!("{}_count", column)
}

/// Counts the distinct values of `column`.
///
/// The result has the columns `{column}` and `{column}_count`, sorted by
/// value. Nulls are not counted.
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if the column is missing.
pub fn value_counts(table: &Table, column: &str) -> Result<Table, TableError> {
    let counts = count_column(table, column)?;
    let (values, totals): (Vec<Value>, Vec<Value>) = counts
        .into_values()
        .map(|(value, count)| (value, Value::from(count)))
        .unzip();

    let mut result = Table::new(table.name());
    result.set_column(column, values)?;
    result.set_column(count_column_name(column), totals)?;
    Ok(result)
}

/// Places the value counts of several columns side by side.
///
/// The first `(table, column)` pair provides the key column, renamed to
/// `main_column`, and its count column. Every later pair adds only its
/// `{column}_count` column, aligned on the first pair's keys; a key the
/// later column never holds counts 0 and keys only the later column holds
/// are dropped.
///
/// # Errors
///
/// Returns `TableError::LengthMismatch` if `tables` and `columns` differ in
/// length, and `TableError::UnknownColumn` for a missing column.
pub fn concat_counts<S: AsRef<str>>(
    tables: &[&Table],
    columns: &[S],
    main_column: &str,
) -> Result<Table, TableError> {
    if tables.len() != columns.len() {
        return Err(TableError::LengthMismatch {
            columns: columns.len(),
            tables: tables.len(),
            fields: columns.len(),
            keys: columns.len(),
        });
    }

    let mut pairs = tables.iter().zip(columns.iter().map(AsRef::as_ref));
    let Some((first_table, first_column)) = pairs.next() else {
        return Ok(Table::new(main_column));
    };

    let first = count_column(first_table, first_column)?;
    let mut result = Table::new(main_column);
    result.set_column(
        main_column,
        first.values().map(|(value, _)| value.clone()).collect(),
    )?;
    result.set_column(
        count_column_name(first_column),
        first.values().map(|(_, count)| Value::from(*count)).collect(),
    )?;

    for (table, column) in pairs {
        let counts = count_column(table, column)?;
        let aligned = first
            .keys()
            .map(|key| Value::from(counts.get(key).map_or(0, |(_, count)| *count)))
            .collect();
        result.set_column(count_column_name(column), aligned)?;
    }

    Ok(result)
}
