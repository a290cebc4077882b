//! Structured errors for configuration loading.
//!
//! Only fatal conditions are represented here. Missing fallback resources,
//! skipped directories and empty files are logged where they happen and never
//! surface as values of [`ConfigurationError`].

use crate::types::DefinitionKind;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoSourcesFound,
    DuplicateDefinition,
    EmptyResult,
    ParseError,
    ResourceUnavailable,
    DatabaseError,
    EmptyTable,
}

/// A fatal configuration error. Any value of this type aborts startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "No {kind} configuration files found in directories: {} with patterns: {}",
        ListDisplay(.directories),
        ListDisplay(.patterns)
    )]
    NoSourcesFound {
        kind: DefinitionKind,
        directories: Vec<String>,
        patterns: Vec<String>,
    },

    #[error(
        "Duplicate {kind} configuration found: {name} in file: {duplicate} (first defined in: {first})"
    )]
    DuplicateDefinition {
        kind: DefinitionKind,
        name: String,
        first: String,
        duplicate: String,
    },

    #[error("No {kind} configurations found in {files} processed files")]
    EmptyResult { kind: DefinitionKind, files: usize },

    #[error("Failed to load {kind} configurations from file: {source_id}: {message}")]
    Parse {
        kind: DefinitionKind,
        source_id: String,
        message: String,
    },

    #[error("Failed to open {kind} configuration source: {source_id}")]
    Resource {
        kind: DefinitionKind,
        source_id: String,
    },

    #[error("Failed to load {kind} configurations from table {table}: {source}")]
    Database {
        kind: DefinitionKind,
        table: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("No {kind} configurations found in table {table}")]
    EmptyTable {
        kind: DefinitionKind,
        table: &'static str,
    },
}

impl ConfigurationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigurationError::NoSourcesFound { .. } => ErrorCode::NoSourcesFound,
            ConfigurationError::DuplicateDefinition { .. } => ErrorCode::DuplicateDefinition,
            ConfigurationError::EmptyResult { .. } => ErrorCode::EmptyResult,
            ConfigurationError::Parse { .. } => ErrorCode::ParseError,
            ConfigurationError::Resource { .. } => ErrorCode::ResourceUnavailable,
            ConfigurationError::Database { .. } => ErrorCode::DatabaseError,
            ConfigurationError::EmptyTable { .. } => ErrorCode::EmptyTable,
        }
    }

    /// The definition kind the failure belongs to.
    pub fn kind(&self) -> DefinitionKind {
        match self {
            ConfigurationError::NoSourcesFound { kind, .. }
            | ConfigurationError::DuplicateDefinition { kind, .. }
            | ConfigurationError::EmptyResult { kind, .. }
            | ConfigurationError::Parse { kind, .. }
            | ConfigurationError::Resource { kind, .. }
            | ConfigurationError::Database { kind, .. }
            | ConfigurationError::EmptyTable { kind, .. } => *kind,
        }
    }

    pub fn parse(
        kind: DefinitionKind,
        source_id: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Parse {
            kind,
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }

    pub fn database(kind: DefinitionKind, table: &'static str, err: anyhow::Error) -> Self {
        Self::Database {
            kind,
            table,
            source: err.into(),
        }
    }
}

/// Renders a list as `[a, b, c]` for operator-facing messages.
struct ListDisplay<'a>(&'a [String]);

impl fmt::Display for ListDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
