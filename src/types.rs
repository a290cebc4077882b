//! Core definition types: databases, queries, endpoints and the merged set.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Category of named configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Database,
    Query,
    Endpoint,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 3] = [
        DefinitionKind::Database,
        DefinitionKind::Query,
        DefinitionKind::Endpoint,
    ];

    /// Top-level document key holding definitions of this kind.
    pub fn section(&self) -> &'static str {
        match self {
            DefinitionKind::Database => "databases",
            DefinitionKind::Query => "queries",
            DefinitionKind::Endpoint => "endpoints",
        }
    }

    /// Relational table backing this kind in database mode.
    pub fn table(&self) -> &'static str {
        match self {
            DefinitionKind::Database => "config_databases",
            DefinitionKind::Query => "config_queries",
            DefinitionKind::Endpoint => "config_endpoints",
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Database => write!(f, "database"),
            DefinitionKind::Query => write!(f, "query"),
            DefinitionKind::Endpoint => write!(f, "endpoint"),
        }
    }
}

/// A named record that can be parsed from a source document.
pub trait Definition: DeserializeOwned + Serialize + Clone + PartialEq + fmt::Debug {
    const KIND: DefinitionKind;

    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// One-line description for startup logging.
    fn summary(&self) -> String;
}

/// Connection pool sizing hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_pool_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_idle: Option<u32>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u64>,
    /// Milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lifetime: Option<u64>,
}

/// A database connection definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolConfig>,
}

impl Definition for DatabaseConfig {
    const KIND: DefinitionKind = DefinitionKind::Database;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn summary(&self) -> String {
        format!("{} (url: {})", self.name, self.url)
    }
}

/// Parameter metadata for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    #[serde(rename = "type", default = "default_parameter_type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
}

fn default_parameter_type() -> String {
    "STRING".to_string()
}

/// A parameterized SQL query bound to a named database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of a [`DatabaseConfig`]; resolved by the connection layer.
    pub database: String,
    pub sql: String,
    #[serde(default)]
    pub parameters: Vec<QueryParameter>,
}

impl Definition for QueryConfig {
    const KIND: DefinitionKind = DefinitionKind::Query;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn summary(&self) -> String {
        format!("{} (database: {})", self.name, self.database)
    }
}

/// Pagination hints for an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_page_size")]
    pub default_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_size: u32,
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

/// Request parameter accepted by an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointParameter {
    pub name: String,
    #[serde(rename = "type", default = "default_parameter_type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    /// Where the value comes from (`QUERY`, `PATH`, `BODY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An API endpoint backed by a named query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    /// Name of a [`QueryConfig`]; resolved by the serving layer.
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,
    #[serde(default)]
    pub parameters: Vec<EndpointParameter>,
    /// Free-form response shape hint. Scalar mapping keys such as HTTP
    /// status codes are stored as strings.
    #[serde(
        default,
        deserialize_with = "deserialize_response",
        skip_serializing_if = "Option::is_none"
    )]
    pub response: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn deserialize_response<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_yaml::Value>::deserialize(deserializer)?
        .map(yaml_to_json)
        .transpose()
        .map_err(serde::de::Error::custom)
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<serde_json::Value, String> {
    use serde_json::Value as Json;
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(b),
        Yaml::Number(n) => {
            if let Some(u) = n.as_u64() {
                Json::from(u)
            } else if let Some(i) = n.as_i64() {
                Json::from(i)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Json::Null, Json::Number)
            }
        }
        Yaml::String(s) => Json::String(s),
        Yaml::Sequence(items) => {
            Json::Array(items.into_iter().map(yaml_to_json).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_string(),
                    _ => return Err("response keys must be scalars".to_string()),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Json::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

impl Definition for EndpointConfig {
    const KIND: DefinitionKind = DefinitionKind::Endpoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn summary(&self) -> String {
        format!("{} {} (query: {})", self.method, self.path, self.query)
    }
}

/// One merged definition and the source that contributed it.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    pub name: String,
    pub origin: String,
    pub definition: T,
}

/// Ordered name -> definition mapping with unique names.
///
/// Entries keep first-seen order. Equality compares names and values only;
/// order and origin are diagnostic.
#[derive(Debug, Clone)]
pub struct Definitions<T> {
    entries: Vec<Entry<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for Definitions<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Definitions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition unless the name is taken.
    ///
    /// On conflict nothing is inserted and the existing entry is returned.
    pub fn try_insert(
        &mut self,
        name: String,
        origin: String,
        definition: T,
    ) -> std::result::Result<(), &Entry<T>> {
        if let Some(&idx) = self.index.get(&name) {
            return Err(&self.entries[idx]);
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Entry {
            name,
            origin,
            definition,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&idx| &self.entries[idx].definition)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry<T>> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.definition))
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }
}

impl<T: PartialEq> PartialEq for Definitions<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, def)| other.get(name).is_some_and(|o| o == def))
    }
}

impl<T: Serialize> Serialize for Definitions<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.definition)?;
        }
        map.end()
    }
}

/// The merged, validated definitions of all kinds.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationSet {
    pub databases: Definitions<DatabaseConfig>,
    pub queries: Definitions<QueryConfig>,
    pub endpoints: Definitions<EndpointConfig>,
}

impl ConfigurationSet {
    pub fn count(&self, kind: DefinitionKind) -> usize {
        match kind {
            DefinitionKind::Database => self.databases.len(),
            DefinitionKind::Query => self.queries.len(),
            DefinitionKind::Endpoint => self.endpoints.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty() && self.queries.is_empty() && self.endpoints.is_empty()
    }
}
