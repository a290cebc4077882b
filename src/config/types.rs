//! Process settings types.
//!
//! These settings tell the loader where definitions live; they are not the
//! definitions themselves.

use crate::types::DefinitionKind;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which backend supplies definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceMode {
    /// YAML files found by directory scanning.
    #[default]
    #[serde(rename = "yaml", alias = "file")]
    File,
    /// Rows in the relational configuration store.
    #[serde(rename = "database")]
    Database,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::File => write!(f, "yaml"),
            SourceMode::Database => write!(f, "database"),
        }
    }
}

impl FromStr for SourceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yaml" | "yml" | "file" => Ok(SourceMode::File),
            "database" | "db" => Ok(SourceMode::Database),
            other => Err(anyhow!(
                "unknown configuration source '{}': expected 'yaml' or 'database'",
                other
            )),
        }
    }
}

/// Top-level settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub config: SourceSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub validation: ValidationSettings,
}

/// Where and how definitions are discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub source: SourceMode,

    /// Database mode: import file definitions when every table is empty.
    #[serde(default, alias = "loadFromYaml")]
    pub load_from_yaml: bool,

    #[serde(default = "default_directories")]
    pub directories: Vec<String>,

    #[serde(default)]
    pub patterns: PatternSettings,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            source: SourceMode::default(),
            load_from_yaml: false,
            directories: default_directories(),
            patterns: PatternSettings::default(),
        }
    }
}

fn default_directories() -> Vec<String> {
    vec!["../generic-config".to_string()]
}

/// Filename patterns per definition kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSettings {
    #[serde(default = "default_database_patterns")]
    pub databases: Vec<String>,

    #[serde(default = "default_query_patterns")]
    pub queries: Vec<String>,

    #[serde(default = "default_endpoint_patterns")]
    pub endpoints: Vec<String>,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            databases: default_database_patterns(),
            queries: default_query_patterns(),
            endpoints: default_endpoint_patterns(),
        }
    }
}

impl PatternSettings {
    pub fn for_kind(&self, kind: DefinitionKind) -> &[String] {
        match kind {
            DefinitionKind::Database => &self.databases,
            DefinitionKind::Query => &self.queries,
            DefinitionKind::Endpoint => &self.endpoints,
        }
    }
}

fn default_database_patterns() -> Vec<String> {
    vec!["*-database.yml".into(), "*-databases.yml".into()]
}

fn default_query_patterns() -> Vec<String> {
    vec!["*-query.yml".into(), "*-queries.yml".into()]
}

fn default_endpoint_patterns() -> Vec<String> {
    vec![
        "*-endpoint.yml".into(),
        "*-endpoints.yml".into(),
        "*-api.yml".into(),
    ]
}

/// Relational configuration store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Create the file (and parent directory) when missing.
    #[serde(default = "default_true", alias = "createIfMissing")]
    pub create_if_missing: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            create_if_missing: true,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/api-service-config.db")
}

fn default_true() -> bool {
    true
}

/// Cross-reference checks run after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Log unresolved references during startup.
    #[serde(default, alias = "runOnStartup")]
    pub run_on_startup: bool,

    /// Stop after validation instead of handing the set on.
    #[serde(default, alias = "validateOnly")]
    pub validate_only: bool,
}

impl Settings {
    /// Replace empty directory and pattern lists with the defaults.
    pub fn fill_empty_lists(&mut self) {
        if self.config.directories.is_empty() {
            self.config.directories = default_directories();
        }
        let patterns = &mut self.config.patterns;
        if patterns.databases.is_empty() {
            patterns.databases = default_database_patterns();
        }
        if patterns.queries.is_empty() {
            patterns.queries = default_query_patterns();
        }
        if patterns.endpoints.is_empty() {
            patterns.endpoints = default_endpoint_patterns();
        }
    }
}
