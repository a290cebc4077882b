//! Database backend: read definitions from the relational store.

use super::ConfigurationLoader;
use crate::config::SourceMode;
use crate::db::Database;
use crate::error::{ConfigurationError, Result};
use crate::types::{DatabaseConfig, Definition, Definitions, EndpointConfig, QueryConfig};
use tracing::{error, info};

/// Loads definitions from the `config_*` tables.
#[derive(Clone)]
pub struct DatabaseConfigurationLoader {
    db: Database,
}

impl DatabaseConfigurationLoader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn load_kind<T: Definition>(
        &self,
        rows: anyhow::Result<Vec<(String, T)>>,
    ) -> Result<Definitions<T>> {
        let kind = T::KIND;
        let table = kind.table();
        let rows = rows.map_err(|e| {
            error!(kind = %kind, table, error = %e, "Failed to read {} configurations", kind);
            ConfigurationError::database(kind, table, e)
        })?;

        let mut definitions = Definitions::new();
        for (name, definition) in rows {
            let origin = format!("{}:{}", table, name);
            if let Err(existing) = definitions.try_insert(name.clone(), origin.clone(), definition)
            {
                return Err(ConfigurationError::DuplicateDefinition {
                    kind,
                    name,
                    first: existing.origin.clone(),
                    duplicate: origin,
                });
            }
        }

        if definitions.is_empty() {
            error!(
                kind = %kind,
                table,
                "FATAL CONFIGURATION ERROR: no {} configurations found in database", kind
            );
            return Err(ConfigurationError::EmptyTable { kind, table });
        }

        info!(
            kind = %kind,
            total = definitions.len(),
            table,
            "Successfully loaded {} configurations from database", kind
        );
        Ok(definitions)
    }
}

impl ConfigurationLoader for DatabaseConfigurationLoader {
    fn source_mode(&self) -> SourceMode {
        SourceMode::Database
    }

    fn load_databases(&self) -> Result<Definitions<DatabaseConfig>> {
        self.load_kind(self.db.list_database_configs())
    }

    fn load_queries(&self) -> Result<Definitions<QueryConfig>> {
        self.load_kind(self.db.list_query_configs())
    }

    fn load_endpoints(&self) -> Result<Definitions<EndpointConfig>> {
        self.load_kind(self.db.list_endpoint_configs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_empty_table_is_fatal() {
        let db = Database::open_in_memory().unwrap();
        let loader = DatabaseConfigurationLoader::new(db);

        let err = loader.load_databases().unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyTable);
        assert!(err.to_string().contains("config_databases"));
    }

    #[test]
    fn test_rows_keep_insertion_order_and_origin() {
        let db = Database::open_in_memory().unwrap();
        for name in ["q2", "q1"] {
            let query: QueryConfig =
                serde_yaml::from_str("database: mainDb\nsql: SELECT 1\n").unwrap();
            db.insert_query_config(name, &query).unwrap();
        }

        let queries = DatabaseConfigurationLoader::new(db).load_queries().unwrap();
        assert_eq!(queries.names().collect::<Vec<_>>(), vec!["q2", "q1"]);
        assert_eq!(queries.entry("q1").unwrap().origin, "config_queries:q1");
        assert_eq!(queries.get("q1").unwrap().name, "q1");
    }

    #[test]
    fn test_corrupt_row_is_database_error() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO config_databases (name, url, pool, created_at, updated_at)
                 VALUES ('broken', 'jdbc:x', '{oops', 0, 0)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let err = DatabaseConfigurationLoader::new(db)
            .load_databases()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }
}
