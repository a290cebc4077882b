//! Query definition rows.

use super::{Database, now_ms};
use crate::types::{QueryConfig, QueryParameter};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub(crate) fn insert_query_internal(
    conn: &Connection,
    name: &str,
    config: &QueryConfig,
) -> Result<()> {
    let now = now_ms();
    let display_name = (config.name != name).then_some(config.name.as_str());
    let parameters = serde_json::to_string(&config.parameters)?;
    conn.execute(
        "INSERT INTO config_queries
             (name, display_name, description, database_name, sql_text, parameters,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            name,
            display_name,
            config.description,
            config.database,
            config.sql,
            parameters,
            now,
            now
        ],
    )?;
    Ok(())
}

impl Database {
    /// Insert one query definition under `name`.
    pub fn insert_query_config(&self, name: &str, config: &QueryConfig) -> Result<()> {
        self.with_conn(|conn| insert_query_internal(conn, name, config))
    }

    /// All query definitions in insertion order.
    pub fn list_query_configs(&self) -> Result<Vec<(String, QueryConfig)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, display_name, description, database_name, sql_text, parameters
                 FROM config_queries ORDER BY rowid",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?;

            let mut configs = Vec::new();
            for row in rows {
                let (name, display_name, description, database, sql, parameters_json) = row?;
                let parameters: Vec<QueryParameter> = serde_json::from_str(&parameters_json)
                    .with_context(|| {
                        format!("Invalid JSON in column 'parameters' of row '{}'", name)
                    })?;
                configs.push((
                    name.clone(),
                    QueryConfig {
                        name: display_name.unwrap_or(name),
                        description,
                        database,
                        sql,
                        parameters,
                    },
                ));
            }
            Ok(configs)
        })
    }

    /// Whether a query definition with `name` exists.
    pub fn has_query_config(&self, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn
                .prepare("SELECT 1 FROM config_queries WHERE name = ?1")?
                .exists(params![name])?;
            Ok(exists)
        })
    }
}
