//! Named collection of tables.
//!
//! The first source loaded becomes the main table; every later one is stored
//! under its name. Column operations address either the main table or a named
//! one and can work in place or on a copy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;

use crate::config::CSV_SUFFIX;
use crate::error_handling::TableError;
use crate::table::{read_csv, write_csv, Record, Table};
use crate::transform::{rewrite_column, split_column, ForeignKeyIndex, ReplacePlan};

/// One input of [`Dataset::load`].
#[derive(Debug, Clone)]
pub enum Source {
    /// Records fetched from an endpoint, named after it
    Records {
        /// Table name
        name: String,
        /// Fetched records
        records: Vec<Record>,
    },
    /// A `{name}_data.csv` file
    File(PathBuf),
}

/// Table addressed by a column operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRef<'a> {
    /// The main table
    Main,
    /// A table stored by name
    Named(&'a str),
}

/// Derives a table name from a file path.
///
/// `games_data.csv` becomes `games`. Paths without the suffix fall back to
/// the file stem, so `games.csv` is also `games`.
pub fn table_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.strip_suffix(CSV_SUFFIX) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    }
}

/// File name a table is saved under.
pub fn table_file_name(name: &str) -> String {
    format!("{}{}", name, CSV_SUFFIX)
}

/// Main table plus auxiliary tables by name.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    main: Option<Table>,
    tables: BTreeMap<String, Table>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every source in order.
    ///
    /// # Errors
    ///
    /// Returns the first file read error. No schema checks are made across
    /// sources.
    pub fn load(sources: impl IntoIterator<Item = Source>) -> Result<Self, TableError> {
        let mut dataset = Self::new();
        for source in sources {
            dataset.push(source)?;
        }
        Ok(dataset)
    }

    /// Loads `{name}_data.csv` files; the first becomes the main table.
    pub fn read_csvs<P: AsRef<Path>>(paths: &[P]) -> Result<Self, TableError> {
        Self::load(
            paths
                .iter()
                .map(|path| Source::File(path.as_ref().to_path_buf())),
        )
    }

    /// Loads one source: the main table if none is set yet, otherwise a
    /// named table (replacing one of the same name).
    pub fn push(&mut self, source: Source) -> Result<(), TableError> {
        let table = match source {
            Source::Records { name, records } => Table::from_records(name, &records),
            Source::File(path) => {
                let name = table_name_from_path(&path);
                let table = read_csv(&path, &name)?;
                debug!("Read {} rows from {}", table.n_rows(), path.display());
                table
            }
        };

        if self.main.is_none() {
            self.main = Some(table);
        } else {
            self.insert(table);
        }
        Ok(())
    }

    /// The main table, if any source was loaded.
    pub fn main(&self) -> Option<&Table> {
        self.main.as_ref()
    }

    /// Mutable access to the main table.
    pub fn main_mut(&mut self) -> Option<&mut Table> {
        self.main.as_mut()
    }

    /// A named table.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Stores `table` under its name and returns the table it replaced.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// Names of the stored tables, sorted. The main table is not included.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Resolves a table reference.
    ///
    /// # Errors
    ///
    /// `TableError::NoMainTable` or `TableError::UnknownTable`.
    pub fn table(&self, target: TableRef<'_>) -> Result<&Table, TableError> {
        match target {
            TableRef::Main => self.main.as_ref().ok_or(TableError::NoMainTable),
            TableRef::Named(name) => self
                .tables
                .get(name)
                .ok_or_else(|| TableError::UnknownTable(name.to_string())),
        }
    }

    /// Mutable variant of [`Dataset::table`].
    pub fn table_mut(&mut self, target: TableRef<'_>) -> Result<&mut Table, TableError> {
        match target {
            TableRef::Main => self.main.as_mut().ok_or(TableError::NoMainTable),
            TableRef::Named(name) => self
                .tables
                .get_mut(name)
                .ok_or_else(|| TableError::UnknownTable(name.to_string())),
        }
    }

    /// Writes every table to `dir` as `{name}_data.csv`, main table first.
    ///
    /// # Returns
    ///
    /// The written paths, in write order.
    pub fn save_csvs(&self, dir: &Path) -> Result<Vec<PathBuf>, TableError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for table in self.main.iter().chain(self.tables.values()) {
            let path = dir.join(table_file_name(table.name()));
            write_csv(table, &path)?;
            info!("Saved {} rows to {}", table.n_rows(), path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Keeps only `columns` of the main table, in the given order.
    ///
    /// With `inplace` the main table is replaced and `None` is returned;
    /// otherwise the filtered copy is returned.
    pub fn filter_columns<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        inplace: bool,
    ) -> Result<Option<Table>, TableError> {
        let filtered = self.table(TableRef::Main)?.select(columns)?;
        if inplace {
            self.main = Some(filtered);
            Ok(None)
        } else {
            Ok(Some(filtered))
        }
    }

    /// Replaces foreign ids in columns of `target` by values of auxiliary
    /// tables.
    ///
    /// The plan, the auxiliary tables and every named column are validated
    /// before anything is rewritten. With `inplace` the target is rewritten
    /// and `None` is returned; otherwise every step is applied to one copy of
    /// the target, which is returned.
    ///
    /// # Errors
    ///
    /// `TableError::LengthMismatch`, `UnknownTable`, `UnknownColumn` or
    /// `NoMainTable`.
    pub fn replace_ids(
        &mut self,
        plan: &ReplacePlan,
        target: TableRef<'_>,
        inplace: bool,
    ) -> Result<Option<Table>, TableError> {
        plan.validate()?;
        let steps = plan.steps();

        let target_table = self.table(target)?;
        for step in &steps {
            target_table.try_column(step.column)?;
        }

        let indexes = steps
            .iter()
            .map(|step| {
                let foreign = self
                    .tables
                    .get(step.foreign_table)
                    .ok_or_else(|| TableError::UnknownTable(step.foreign_table.to_string()))?;
                ForeignKeyIndex::build(foreign, step.key_column, step.value_column)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let apply = |table: &mut Table| -> Result<(), TableError> {
            for (step, index) in steps.iter().zip(&indexes) {
                rewrite_column(table, step.column, index)?;
            }
            Ok(())
        };

        if inplace {
            apply(self.table_mut(target)?)?;
            Ok(None)
        } else {
            let mut copy = self.table(target)?.clone();
            apply(&mut copy)?;
            Ok(Some(copy))
        }
    }

    /// Adds `{column}_{value}` columns to `target`, see
    /// [`crate::transform::split_column`].
    ///
    /// With `inplace` the target is extended and `None` is returned;
    /// otherwise the extended copy is returned.
    pub fn split_column(
        &mut self,
        column: &str,
        by: &str,
        values: &[Value],
        target: TableRef<'_>,
        inplace: bool,
    ) -> Result<Option<Table>, TableError> {
        if inplace {
            split_column(self.table_mut(target)?, column, by, values)?;
            Ok(None)
        } else {
            let mut copy = self.table(target)?.clone();
            split_column(&mut copy, column, by, values)?;
            Ok(Some(copy))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn records(rows: Value) -> Vec<Record> {
        rows.as_array()
            .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
            .unwrap_or_default()
    }

    fn games_dataset() -> Dataset {
        Dataset::load([
            Source::Records {
                name: "games".to_string(),
                records: records(json!([
                    {"id": 10, "name": "Doom", "genres": [1, 2], "platform": 6},
                    {"id": 11, "name": "Myst", "genres": [2], "platform": 48},
                    {"id": 12, "name": "Quake", "genres": null, "platform": 99},
                ])),
            },
            Source::Records {
                name: "genres".to_string(),
                records: records(json!([
                    {"id": 1, "name": "RPG"},
                    {"id": 2, "name": "FPS"},
                ])),
            },
            Source::Records {
                name: "platforms".to_string(),
                records: records(json!([
                    {"uid": 6, "abbreviation": "PC"},
                    {"uid": 48, "abbreviation": "PS4"},
                ])),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_table_name_from_path() {
        assert_eq!(table_name_from_path(Path::new("out/games_data.csv")), "games");
        assert_eq!(table_name_from_path(Path::new("genres.csv")), "genres");
        assert_eq!(table_name_from_path(Path::new("_data.csv")), "_data");
        assert_eq!(table_file_name("games"), "games_data.csv");
    }

    #[test]
    fn test_load_first_source_is_main() {
        let dataset = games_dataset();
        assert_eq!(dataset.main().map(Table::name), Some("games"));
        assert_eq!(dataset.table_names(), vec!["genres", "platforms"]);
        assert!(dataset.get("games").is_none());
        assert_eq!(dataset.get("genres").map(Table::n_rows), Some(2));
    }

    #[test]
    fn test_empty_dataset_has_no_main() {
        let mut dataset = Dataset::new();
        assert!(matches!(
            dataset.filter_columns(&["id"], false),
            Err(TableError::NoMainTable)
        ));
        assert!(matches!(
            dataset.table(TableRef::Named("genres")),
            Err(TableError::UnknownTable(name)) if name == "genres"
        ));
    }

    #[test]
    fn test_replace_ids_copy_leaves_original() {
        let mut dataset = games_dataset();
        let plan = ReplacePlan::new(["genres"], ["genres"], ["name"]);

        let copy = dataset
            .replace_ids(&plan, TableRef::Main, false)
            .unwrap()
            .unwrap();

        assert_eq!(
            copy.column("genres").unwrap().cells,
            vec![json!(["RPG", "FPS"]), json!(["FPS"]), Value::Null]
        );
        assert_eq!(
            dataset.main().unwrap().cell(0, "genres"),
            Some(&json!([1, 2]))
        );
    }

    #[test]
    fn test_replace_ids_inplace_multiple_columns() {
        let mut dataset = games_dataset();
        let plan = ReplacePlan::new(
            ["genres", "platform"],
            ["genres", "platforms"],
            ["name", "abbreviation"],
        )
        .with_key_columns(["id", "uid"]);

        let result = dataset.replace_ids(&plan, TableRef::Main, true).unwrap();
        assert!(result.is_none());

        let main = dataset.main().unwrap();
        assert_eq!(main.cell(0, "genres"), Some(&json!(["RPG", "FPS"])));
        assert_eq!(
            main.column("platform").unwrap().cells,
            vec![json!("PC"), json!("PS4"), Value::Null]
        );
    }

    #[test]
    fn test_replace_ids_validates_before_mutating() {
        let mut dataset = games_dataset();
        let before = dataset.main().cloned();

        let mismatched = ReplacePlan::new(vec!["genres", "platform"], vec!["genres"], vec!["name"]);
        assert!(matches!(
            dataset.replace_ids(&mismatched, TableRef::Main, true),
            Err(TableError::LengthMismatch { .. })
        ));

        let unknown_table = ReplacePlan::new(["genres", "themes"], ["genres", "themes"], ["name", "name"]);
        assert!(matches!(
            dataset.replace_ids(&unknown_table, TableRef::Main, true),
            Err(TableError::UnknownTable(name)) if name == "themes"
        ));

        let unknown_column = ReplacePlan::new(["genres", "modes"], ["genres", "genres"], ["name", "name"]);
        assert!(matches!(
            dataset.replace_ids(&unknown_column, TableRef::Main, true),
            Err(TableError::UnknownColumn { column, .. }) if column == "modes"
        ));

        assert_eq!(dataset.main().cloned(), before);
    }

    #[test]
    fn test_replace_ids_on_named_table() {
        let mut dataset = games_dataset();
        dataset.insert(Table::from_records(
            "reviews",
            &records(json!([{"game": 1}, {"game": 3}])),
        ));
        let plan = ReplacePlan::new(["game"], ["genres"], ["name"]);

        dataset
            .replace_ids(&plan, TableRef::Named("reviews"), true)
            .unwrap();

        assert_eq!(
            dataset.get("reviews").unwrap().column("game").unwrap().cells,
            vec![json!("RPG"), Value::Null]
        );
    }

    #[test]
    fn test_filter_columns() {
        let mut dataset = games_dataset();

        let copy = dataset.filter_columns(&["name", "id"], false).unwrap().unwrap();
        assert_eq!(copy.column_names(), vec!["name", "id"]);
        assert_eq!(dataset.main().unwrap().n_cols(), 4);

        assert!(dataset.filter_columns(&["name"], true).unwrap().is_none());
        assert_eq!(dataset.main().unwrap().column_names(), vec!["name"]);

        assert!(dataset.filter_columns(&["missing"], true).is_err());
        assert_eq!(dataset.main().unwrap().column_names(), vec!["name"]);
    }

    #[test]
    fn test_split_column_inplace_and_copy() {
        let mut dataset = games_dataset();

        let copy = dataset
            .split_column("name", "platform", &[json!(6)], TableRef::Main, false)
            .unwrap()
            .unwrap();
        assert_eq!(copy.cell(0, "name_6"), Some(&json!("Doom")));
        assert!(dataset.main().unwrap().column("name_6").is_none());

        dataset
            .split_column("name", "platform", &[json!(48)], TableRef::Main, true)
            .unwrap();
        assert_eq!(
            dataset.main().unwrap().column("name_48").unwrap().cells,
            vec![Value::Null, json!("Myst"), Value::Null]
        );
    }

    #[test]
    fn test_save_and_read_csvs() {
        let dir = TempDir::new().unwrap();
        let dataset = games_dataset();

        let written = dataset.save_csvs(dir.path()).unwrap();
        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            names,
            vec!["games_data.csv", "genres_data.csv", "platforms_data.csv"]
        );

        let reloaded = Dataset::read_csvs(written.as_slice()).unwrap();
        let main = reloaded.main().unwrap();
        assert_eq!(main.name(), "games");
        assert_eq!(main.n_rows(), 3);
        assert_eq!(reloaded.table_names(), vec!["genres", "platforms"]);

        // list cells come back as literal text and are parsed on rewrite
        let mut reloaded = reloaded;
        let plan = ReplacePlan::new(["genres"], ["genres"], ["name"]);
        let copy = reloaded
            .replace_ids(&plan, TableRef::Main, false)
            .unwrap()
            .unwrap();
        assert_eq!(copy.cell(0, "genres"), Some(&json!(["RPG", "FPS"])));
        assert_eq!(copy.cell(2, "genres"), Some(&Value::Null));
    }
}
