//! Import of a resolved configuration set into the store.
//!
//! Supports three modes:
//! - Fresh: Import into an empty store (fails if any rows exist)
//! - Replace: Clear every configuration table, then import
//! - Merge: Insert definitions whose name is not stored yet, skip the rest
//!
//! The whole import runs in one transaction.

use super::Database;
use super::databases::insert_database_internal;
use super::endpoints::insert_endpoint_internal;
use super::queries::insert_query_internal;
use crate::types::{ConfigurationSet, Definition, Definitions, DefinitionKind};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Import mode determining how to handle existing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Import into an empty store. Fails if any rows exist.
    #[default]
    Fresh,
    /// Delete all stored definitions before importing.
    Replace,
    /// Keep stored definitions, add only unknown names.
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImportMode::Fresh => "fresh",
            ImportMode::Replace => "replace",
            ImportMode::Merge => "merge",
        })
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fresh" => Ok(ImportMode::Fresh),
            "replace" => Ok(ImportMode::Replace),
            "merge" => Ok(ImportMode::Merge),
            other => Err(format!(
                "unknown import mode '{}', expected fresh, replace or merge",
                other
            )),
        }
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    /// Number of rows imported per table.
    pub rows_imported: BTreeMap<String, usize>,
    /// Number of rows deleted per table (replace mode).
    pub rows_deleted: BTreeMap<String, usize>,
    /// Number of rows skipped per table (merge mode).
    pub rows_skipped: BTreeMap<String, usize>,
}

impl ImportResult {
    /// Total number of rows imported.
    pub fn total_rows(&self) -> usize {
        self.rows_imported.values().sum()
    }

    /// Total number of rows deleted.
    pub fn total_deleted(&self) -> usize {
        self.rows_deleted.values().sum()
    }

    /// Total number of rows skipped.
    pub fn total_skipped(&self) -> usize {
        self.rows_skipped.values().sum()
    }
}

type InsertFn<T> = fn(&Connection, &str, &T) -> Result<()>;

impl Database {
    /// Store every definition of `set` according to `mode`.
    pub fn import_configuration_set(
        &self,
        set: &ConfigurationSet,
        mode: ImportMode,
    ) -> Result<ImportResult> {
        let mut result = ImportResult::default();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            match mode {
                ImportMode::Fresh => validate_empty(&tx)?,
                ImportMode::Replace => result.rows_deleted = clear_tables(&tx)?,
                ImportMode::Merge => {}
            }

            let merge = mode == ImportMode::Merge;
            import_kind(
                &tx,
                &set.databases,
                insert_database_internal,
                merge,
                &mut result,
            )?;
            import_kind(
                &tx,
                &set.queries,
                insert_query_internal,
                merge,
                &mut result,
            )?;
            import_kind(
                &tx,
                &set.endpoints,
                insert_endpoint_internal,
                merge,
                &mut result,
            )?;

            tx.commit()?;
            Ok(())
        })?;

        tracing::info!(
            "Imported {} configuration rows ({} mode, {} deleted, {} skipped)",
            result.total_rows(),
            mode,
            result.total_deleted(),
            result.total_skipped()
        );

        Ok(result)
    }

    /// Delete every stored definition.
    ///
    /// # Returns
    /// A map of table names to number of rows deleted.
    pub fn clear_configuration(&self) -> Result<BTreeMap<String, usize>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = clear_tables(&tx)?;
            tx.commit()?;
            Ok(deleted)
        })
    }
}

fn table_count(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

fn validate_empty(conn: &Connection) -> Result<()> {
    for kind in DefinitionKind::ALL {
        let count = table_count(conn, kind.table())?;
        if count > 0 {
            return Err(anyhow!(
                "Configuration store is not empty: table '{}' contains {} rows. Use --mode replace or --mode merge.",
                kind.table(),
                count
            ));
        }
    }
    Ok(())
}

fn clear_tables(conn: &Connection) -> Result<BTreeMap<String, usize>> {
    let mut deleted = BTreeMap::new();
    for kind in DefinitionKind::ALL.iter().rev() {
        let count = table_count(conn, kind.table())?;
        if count > 0 {
            conn.execute(&format!("DELETE FROM {}", kind.table()), [])?;
            deleted.insert(kind.table().to_string(), count);
        }
    }
    Ok(deleted)
}

fn row_exists(conn: &Connection, table: &str, name: &str) -> Result<bool> {
    let exists = conn
        .prepare(&format!("SELECT 1 FROM {} WHERE name = ?1", table))?
        .exists(params![name])?;
    Ok(exists)
}

fn import_kind<T: Definition>(
    conn: &Connection,
    definitions: &Definitions<T>,
    insert: InsertFn<T>,
    merge: bool,
    result: &mut ImportResult,
) -> Result<()> {
    let table = T::KIND.table();
    let mut imported = 0;
    let mut skipped = 0;

    for (name, definition) in definitions.iter() {
        if merge && row_exists(conn, table, name)? {
            tracing::debug!("Skipping existing {} '{}'", T::KIND, name);
            skipped += 1;
            continue;
        }
        insert(conn, name, definition)?;
        imported += 1;
    }

    result.rows_imported.insert(table.to_string(), imported);
    if skipped > 0 {
        result.rows_skipped.insert(table.to_string(), skipped);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatabaseConfig, QueryConfig};

    fn database(url: &str) -> DatabaseConfig {
        serde_yaml::from_str(&format!("url: {}\n", url)).unwrap()
    }

    fn query(db: &str) -> QueryConfig {
        serde_yaml::from_str(&format!("database: {}\nsql: SELECT 1\n", db)).unwrap()
    }

    fn sample_set() -> ConfigurationSet {
        let mut set = ConfigurationSet::default();
        set.databases
            .try_insert("mainDb".into(), "a.yml".into(), database("jdbc:h2:mem:a"))
            .unwrap();
        set.queries
            .try_insert("q1".into(), "b.yml".into(), query("mainDb"))
            .unwrap();
        set
    }

    #[test]
    fn test_import_mode_parse() {
        assert_eq!("fresh".parse::<ImportMode>().unwrap(), ImportMode::Fresh);
        assert_eq!("REPLACE".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert_eq!("merge".parse::<ImportMode>().unwrap(), ImportMode::Merge);
        assert!("other".parse::<ImportMode>().is_err());
        assert_eq!(ImportMode::default(), ImportMode::Fresh);
    }

    #[test]
    fn test_fresh_import_counts_rows() {
        let db = Database::open_in_memory().unwrap();
        let result = db
            .import_configuration_set(&sample_set(), ImportMode::Fresh)
            .unwrap();

        assert_eq!(result.rows_imported["config_databases"], 1);
        assert_eq!(result.rows_imported["config_queries"], 1);
        assert_eq!(result.rows_imported["config_endpoints"], 0);
        assert_eq!(result.total_rows(), 2);
        assert!(result.rows_deleted.is_empty());
    }

    #[test]
    fn test_fresh_import_into_populated_store_fails() {
        let db = Database::open_in_memory().unwrap();
        db.import_configuration_set(&sample_set(), ImportMode::Fresh)
            .unwrap();

        let err = db
            .import_configuration_set(&sample_set(), ImportMode::Fresh)
            .unwrap_err();
        assert!(err.to_string().contains("not empty"));
        assert_eq!(db.count(DefinitionKind::Database).unwrap(), 1);
    }

    #[test]
    fn test_replace_import_clears_old_rows() {
        let db = Database::open_in_memory().unwrap();
        db.insert_database_config("legacyDb", &database("jdbc:h2:mem:old"))
            .unwrap();

        let result = db
            .import_configuration_set(&sample_set(), ImportMode::Replace)
            .unwrap();
        assert_eq!(result.rows_deleted["config_databases"], 1);

        let names: Vec<_> = db
            .list_database_configs()
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["mainDb"]);
    }

    #[test]
    fn test_merge_import_skips_existing_names() {
        let db = Database::open_in_memory().unwrap();
        db.insert_database_config("mainDb", &database("jdbc:h2:mem:kept"))
            .unwrap();

        let result = db
            .import_configuration_set(&sample_set(), ImportMode::Merge)
            .unwrap();
        assert_eq!(result.rows_skipped["config_databases"], 1);
        assert_eq!(result.rows_imported["config_databases"], 0);
        assert_eq!(result.rows_imported["config_queries"], 1);

        let stored = db.list_database_configs().unwrap();
        assert_eq!(stored[0].1.url, "jdbc:h2:mem:kept");
    }

    #[test]
    fn test_clear_configuration() {
        let db = Database::open_in_memory().unwrap();
        db.import_configuration_set(&sample_set(), ImportMode::Fresh)
            .unwrap();

        let deleted = db.clear_configuration().unwrap();
        assert_eq!(deleted.values().sum::<usize>(), 2);
        assert!(db.is_empty().unwrap());
    }
}
