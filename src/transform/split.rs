//! Splitting one column into per-value columns.

use log::debug;
use serde_json::Value;

use crate::error_handling::TableError;
use crate::table::{cell_label, cells_match, Table};

/// Name of the column holding `column`'s cells where the discriminator
/// equals `value`.
pub fn split_column_name(column: &str, value: &Value) -> String {
    format!("{}_{}", column, cell_label(value))
}

/// Adds one `{column}_{value}` column per entry of `values`.
///
/// Each new column copies the cell of `column` on rows whose `by` cell
/// equals the value (numbers compare numerically) and is null elsewhere.
/// An existing column with the same name is overwritten.
///
/// # Arguments
///
/// * `table` - Table to extend
/// * `column` - Source column
/// * `by` - Discriminator column
/// * `values` - Discriminator values to split on
///
/// # Returns
///
/// The names of the added columns, in the order of `values`.
///
/// # Errors
///
/// Returns `TableError::UnknownColumn` if `column` or `by` is missing. The
/// table is unchanged in that case.
pub fn split_column(
    table: &mut Table,
    column: &str,
    by: &str,
    values: &[Value],
) -> Result<Vec<String>, TableError> {
    let source = table.try_column(column)?.cells.clone();
    let discriminator = table.try_column(by)?.cells.clone();

    let mut added = Vec::with_capacity(values.len());
    for value in values {
        let cells = source
            .iter()
            .zip(&discriminator)
            .map(|(cell, key)| {
                if cells_match(key, value) {
                    cell.clone()
                } else {
                    Value::Null
                }
            })
            .collect();
        let name = split_column_name(column, value);
        table.set_column(name.clone(), cells)?;
        added.push(name);
    }

    debug!(
        "Split '{}' of table '{}' by '{}' into {:?}",
        column,
        table.name(),
        by,
        added
    );
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;
    use serde_json::json;

    fn scores() -> Table {
        let records: Vec<Record> = [
            json!({"score": 90, "region": "EU"}),
            json!({"score": 80, "region": "US"}),
            json!({"score": 70, "region": "EU"}),
            json!({"score": 60, "region": null}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        Table::from_records("scores", &records)
    }

    #[test]
    fn test_split_by_region() {
        let mut table = scores();
        let added = split_column(&mut table, "score", "region", &[json!("EU"), json!("US")]).unwrap();

        assert_eq!(added, vec!["score_EU", "score_US"]);
        assert_eq!(table.n_cols(), 4);
        assert_eq!(
            table.column("score_EU").unwrap().cells,
            vec![json!(90), Value::Null, json!(70), Value::Null]
        );
        assert_eq!(
            table.column("score_US").unwrap().cells,
            vec![Value::Null, json!(80), Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_split_numeric_discriminator() {
        let records: Vec<Record> = [
            json!({"rating": 7.5, "platform": 6}),
            json!({"rating": 8.0, "platform": 48.0}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        let mut table = Table::from_records("ratings", &records);

        let added = split_column(&mut table, "rating", "platform", &[json!(6.0), json!(48)]).unwrap();

        assert_eq!(added, vec!["rating_6", "rating_48"]);
        assert_eq!(
            table.column("rating_6").unwrap().cells,
            vec![json!(7.5), Value::Null]
        );
        assert_eq!(
            table.column("rating_48").unwrap().cells,
            vec![Value::Null, json!(8.0)]
        );
    }

    #[test]
    fn test_split_value_without_matches() {
        let mut table = scores();
        split_column(&mut table, "score", "region", &[json!("JP")]).unwrap();
        assert!(table
            .column("score_JP")
            .unwrap()
            .cells
            .iter()
            .all(Value::is_null));
    }

    #[test]
    fn test_split_unknown_columns_leave_table_unchanged() {
        let mut table = scores();
        let before = table.clone();

        assert!(split_column(&mut table, "score", "country", &[json!("EU")]).is_err());
        assert!(split_column(&mut table, "points", "region", &[json!("EU")]).is_err());
        assert_eq!(table, before);
    }
}
