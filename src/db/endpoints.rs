//! Endpoint definition rows.

use super::{Database, from_json_opt, now_ms, to_json_opt};
use crate::types::{EndpointConfig, EndpointParameter, PaginationConfig};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub(crate) fn insert_endpoint_internal(
    conn: &Connection,
    name: &str,
    config: &EndpointConfig,
) -> Result<()> {
    let now = now_ms();
    let display_name = (config.name != name).then_some(config.name.as_str());
    let parameters = serde_json::to_string(&config.parameters)?;
    conn.execute(
        "INSERT INTO config_endpoints
             (name, display_name, description, method, path, query_name, count_query,
              pagination, parameters, response, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            name,
            display_name,
            config.description,
            config.method,
            config.path,
            config.query,
            config.count_query,
            to_json_opt(&config.pagination)?,
            parameters,
            to_json_opt(&config.response)?,
            now,
            now
        ],
    )?;
    Ok(())
}

/// Raw column values of one endpoint row.
struct EndpointRow {
    name: String,
    display_name: Option<String>,
    description: Option<String>,
    method: String,
    path: String,
    query: String,
    count_query: Option<String>,
    pagination: Option<String>,
    parameters: String,
    response: Option<String>,
}

impl EndpointRow {
    fn into_config(self) -> Result<(String, EndpointConfig)> {
        let name = self.name;
        let pagination: Option<PaginationConfig> =
            from_json_opt(self.pagination, "pagination", &name)?;
        let response: Option<serde_json::Value> = from_json_opt(self.response, "response", &name)?;
        let parameters: Vec<EndpointParameter> = serde_json::from_str(&self.parameters)
            .with_context(|| format!("Invalid JSON in column 'parameters' of row '{}'", name))?;

        Ok((
            name.clone(),
            EndpointConfig {
                name: self.display_name.unwrap_or(name),
                description: self.description,
                method: self.method,
                path: self.path,
                query: self.query,
                count_query: self.count_query,
                pagination,
                parameters,
                response,
            },
        ))
    }
}

impl Database {
    /// Insert one endpoint definition under `name`.
    pub fn insert_endpoint_config(&self, name: &str, config: &EndpointConfig) -> Result<()> {
        self.with_conn(|conn| insert_endpoint_internal(conn, name, config))
    }

    /// All endpoint definitions in insertion order.
    pub fn list_endpoint_configs(&self) -> Result<Vec<(String, EndpointConfig)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, display_name, description, method, path, query_name, count_query,
                        pagination, parameters, response
                 FROM config_endpoints ORDER BY rowid",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok(EndpointRow {
                    name: row.get(0)?,
                    display_name: row.get(1)?,
                    description: row.get(2)?,
                    method: row.get(3)?,
                    path: row.get(4)?,
                    query: row.get(5)?,
                    count_query: row.get(6)?,
                    pagination: row.get(7)?,
                    parameters: row.get(8)?,
                    response: row.get(9)?,
                })
            })?;

            let mut configs = Vec::new();
            for row in rows {
                configs.push(row?.into_config()?);
            }
            Ok(configs)
        })
    }

    /// Whether an endpoint definition with `name` exists.
    pub fn has_endpoint_config(&self, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn
                .prepare("SELECT 1 FROM config_endpoints WHERE name = ?1")?
                .exists(params![name])?;
            Ok(exists)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_list_full_endpoint() {
        let db = Database::open_in_memory().unwrap();
        let endpoint = EndpointConfig {
            name: "trades-list".into(),
            description: Some("Paged trades".into()),
            method: "GET".into(),
            path: "/api/generic/stock-trades".into(),
            query: "stock-trades-all".into(),
            count_query: Some("stock-trades-count".into()),
            pagination: Some(PaginationConfig {
                enabled: true,
                default_size: 20,
                max_size: 100,
            }),
            parameters: vec![EndpointParameter {
                name: "page".into(),
                param_type: "INTEGER".into(),
                required: false,
                source: Some("QUERY".into()),
                description: None,
            }],
            response: Some(json!({"type": "PAGED", "fields": [{"name": "id", "type": "LONG"}]})),
        };
        db.insert_endpoint_config("trades-list", &endpoint).unwrap();

        let rows = db.list_endpoint_configs().unwrap();
        assert_eq!(rows, vec![("trades-list".to_string(), endpoint)]);
        assert!(db.has_endpoint_config("trades-list").unwrap());
    }

    #[test]
    fn test_minimal_endpoint_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let endpoint: EndpointConfig =
            serde_yaml::from_str("path: /api/x\nquery: qx\n").unwrap();
        db.insert_endpoint_config("x", &endpoint).unwrap();

        let (name, loaded) = db.list_endpoint_configs().unwrap().remove(0);
        assert_eq!(name, "x");
        assert_eq!(loaded.name, "x");
        assert_eq!(loaded.method, "GET");
        assert!(loaded.pagination.is_none());
        assert!(loaded.response.is_none());
    }

    #[test]
    fn test_status_keyed_response_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let endpoint: EndpointConfig = serde_yaml::from_str(
            "path: /api/x\nquery: qx\nresponse:\n  200: { type: OBJECT }\n",
        )
        .unwrap();
        db.insert_endpoint_config("x", &endpoint).unwrap();

        let (_, loaded) = db.list_endpoint_configs().unwrap().remove(0);
        assert_eq!(loaded.response, Some(json!({"200": {"type": "OBJECT"}})));
        assert_eq!(loaded, endpoint);
    }
}
