//! Database definition rows.

use super::{Database, from_json_opt, now_ms, to_json_opt};
use crate::types::{DatabaseConfig, PoolConfig};
use anyhow::Result;
use rusqlite::{Connection, params};

/// Internal insert using an existing connection (for transactions).
pub(crate) fn insert_database_internal(
    conn: &Connection,
    name: &str,
    config: &DatabaseConfig,
) -> Result<()> {
    let now = now_ms();
    let display_name = (config.name != name).then_some(config.name.as_str());
    conn.execute(
        "INSERT INTO config_databases
             (name, display_name, description, url, username, password, driver, pool,
              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            name,
            display_name,
            config.description,
            config.url,
            config.username,
            config.password,
            config.driver,
            to_json_opt(&config.pool)?,
            now,
            now
        ],
    )?;
    Ok(())
}

impl Database {
    /// Insert one database definition under `name`.
    pub fn insert_database_config(&self, name: &str, config: &DatabaseConfig) -> Result<()> {
        self.with_conn(|conn| insert_database_internal(conn, name, config))
    }

    /// All database definitions in insertion order.
    pub fn list_database_configs(&self) -> Result<Vec<(String, DatabaseConfig)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, display_name, description, url, username, password, driver, pool
                 FROM config_databases ORDER BY rowid",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?;

            let mut configs = Vec::new();
            for row in rows {
                let (name, display_name, description, url, username, password, driver, pool) =
                    row?;
                let pool: Option<PoolConfig> = from_json_opt(pool, "pool", &name)?;
                configs.push((
                    name.clone(),
                    DatabaseConfig {
                        name: display_name.unwrap_or(name),
                        description,
                        url,
                        username,
                        password,
                        driver,
                        pool,
                    },
                ));
            }
            Ok(configs)
        })
    }

    /// Whether a database definition with `name` exists.
    pub fn has_database_config(&self, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn
                .prepare("SELECT 1 FROM config_databases WHERE name = ?1")?
                .exists(params![name])?;
            Ok(exists)
        })
    }
}
