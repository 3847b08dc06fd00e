//! Foreign id resolution ("replace ids").
//!
//! A [`ForeignKeyIndex`] maps the values of a key column of an auxiliary
//! table to the values of one of its other columns. [`rewrite_column`]
//! replaces every id in a column of another table, including ids inside
//! list cells, with the indexed value. The rewrite is total: ids missing
//! from the index, nulls and unparseable text all resolve to null.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::config::DEFAULT_KEY_COLUMN;
use crate::error_handling::TableError;
use crate::table::literal::parse_cell;
use crate::table::Table;

/// Normalized lookup key.
///
/// `1`, `1.0` and `"1"` all become `Int(1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Integral number, or text holding one
    Int(i64),
    /// Any other text or non-integral number
    Text(String),
}

impl IndexKey {
    /// Coerces a cell into a key, `None` for null, lists and objects.
    pub fn from_cell(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(int) => IndexKey::Int(int),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        IndexKey::Int(f as i64)
                    }
                    _ => IndexKey::Text(n.to_string()),
                },
            }),
            Value::String(s) => Some(match s.trim().parse::<i64>() {
                Ok(int) => IndexKey::Int(int),
                Err(_) => IndexKey::Text(s.clone()),
            }),
            Value::Bool(b) => Some(IndexKey::Int(i64::from(*b))),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Key to value mapping built from an auxiliary table.
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyIndex {
    entries: HashMap<IndexKey, Value>,
}

impl ForeignKeyIndex {
    /// Builds the index from `key_column` to `value_column` of `table`.
    ///
    /// Rows with a null or list key are skipped. When a key repeats, the last
    /// row wins.
    ///
    /// # Errors
    ///
    /// Returns `TableError::UnknownColumn` if either column is missing.
    pub fn build(table: &Table, key_column: &str, value_column: &str) -> Result<Self, TableError> {
        let keys = table.try_column(key_column)?;
        let values = table.try_column(value_column)?;

        let entries = keys
            .cells
            .iter()
            .zip(values.cells.iter())
            .filter_map(|(key, value)| IndexKey::from_cell(key).map(|k| (k, value.clone())))
            .collect();
        Ok(Self { entries })
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up one id, null when absent.
    pub fn lookup(&self, id: &Value) -> Value {
        IndexKey::from_cell(id)
            .and_then(|key| self.entries.get(&key))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Resolves one cell against the index.
///
/// Text is first run through the parse chain. Lists map element-wise, other
/// non-null values are looked up directly, null stays null.
pub fn resolve_cell(cell: &Value, index: &ForeignKeyIndex) -> Value {
    let parsed = match cell {
        Value::String(text) => parse_cell(text).into_value(),
        other => other.clone(),
    };
    match parsed {
        Value::Null => Value::Null,
        Value::Array(ids) => Value::Array(ids.iter().map(|id| index.lookup(id)).collect()),
        scalar => index.lookup(&scalar),
    }
}

/// Rewrites `column` of `table` in place.
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if the column is missing.
pub fn rewrite_column(
    table: &mut Table,
    column: &str,
    index: &ForeignKeyIndex,
) -> Result<(), TableError> {
    let target = table.try_column_mut(column)?;
    let mut misses = 0usize;
    for cell in target.cells.iter_mut() {
        let was_null = cell.is_null();
        *cell = resolve_cell(cell, index);
        if cell.is_null() && !was_null {
            misses += 1;
        }
    }
    debug!(
        "Rewrote column '{}' ({} cells, {} unresolved)",
        column,
        target.cells.len(),
        misses
    );
    Ok(())
}

/// Key columns of a [`ReplacePlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyColumns {
    /// One key column used for every foreign table
    Shared(String),
    /// One key column per rewritten column
    PerColumn(Vec<String>),
}

impl Default for KeyColumns {
    fn default() -> Self {
        KeyColumns::Shared(DEFAULT_KEY_COLUMN.to_string())
    }
}

/// One column rewrite: target column, foreign table, value and key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceStep<'a> {
    /// Column of the target table to rewrite
    pub column: &'a str,
    /// Name of the auxiliary table
    pub foreign_table: &'a str,
    /// Column of the auxiliary table holding the replacement values
    pub value_column: &'a str,
    /// Column of the auxiliary table holding the ids
    pub key_column: &'a str,
}

/// Several column rewrites given as parallel lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacePlan {
    /// Columns of the target table to rewrite
    pub columns: Vec<String>,
    /// Auxiliary table per column
    pub foreign_tables: Vec<String>,
    /// Value column per auxiliary table
    pub value_columns: Vec<String>,
    /// Key column(s) of the auxiliary tables
    pub key_columns: KeyColumns,
}

impl ReplacePlan {
    /// Creates a plan using the shared `id` key column.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        foreign_tables: impl IntoIterator<Item = S>,
        value_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            foreign_tables: foreign_tables.into_iter().map(Into::into).collect(),
            value_columns: value_columns.into_iter().map(Into::into).collect(),
            key_columns: KeyColumns::default(),
        }
    }

    /// Uses `key` as the key column of every foreign table.
    pub fn with_shared_key(mut self, key: impl Into<String>) -> Self {
        self.key_columns = KeyColumns::Shared(key.into());
        self
    }

    /// Uses one key column per rewritten column.
    pub fn with_key_columns<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.key_columns = KeyColumns::PerColumn(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Checks that the parallel lists have equal length.
    ///
    /// # Errors
    ///
    /// Returns `TableError::LengthMismatch` otherwise.
    pub fn validate(&self) -> Result<(), TableError> {
        let keys = match &self.key_columns {
            KeyColumns::Shared(_) => self.columns.len(),
            KeyColumns::PerColumn(keys) => keys.len(),
        };
        let n = self.columns.len();
        if self.foreign_tables.len() != n || self.value_columns.len() != n || keys != n {
            return Err(TableError::LengthMismatch {
                columns: n,
                tables: self.foreign_tables.len(),
                fields: self.value_columns.len(),
                keys,
            });
        }
        Ok(())
    }

    /// The rewrite steps in order. Call [`ReplacePlan::validate`] first; extra
    /// entries of longer lists are ignored.
    pub fn steps(&self) -> Vec<ReplaceStep<'_>> {
        self.columns
            .iter()
            .zip(&self.foreign_tables)
            .zip(&self.value_columns)
            .enumerate()
            .filter_map(|(i, ((column, foreign_table), value_column))| {
                let key_column = match &self.key_columns {
                    KeyColumns::Shared(key) => Some(key.as_str()),
                    KeyColumns::PerColumn(keys) => keys.get(i).map(String::as_str),
                }?;
                Some(ReplaceStep {
                    column,
                    foreign_table,
                    value_column,
                    key_column,
                })
            })
            .collect()
    }
}
