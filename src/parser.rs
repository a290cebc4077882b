//! Source parsing: one YAML document into named definitions of one kind.
//!
//! The document's top-level key selects the kind (`databases`, `queries`,
//! `endpoints`). A missing or empty section means "no definitions here" and is
//! only a warning; malformed content is a fatal parse error.

use crate::error::{ConfigurationError, Result};
use crate::types::Definition;
use serde_yaml::Value;
use std::io::Read;
use tracing::warn;

/// Definitions parsed from a single source, in document order.
#[derive(Debug, Clone)]
pub struct ParsedSource<T> {
    pub origin: String,
    pub definitions: Vec<(String, T)>,
}

impl<T> ParsedSource<T> {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Stateless YAML parser for definition documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a whole source. `origin` names it in diagnostics.
    pub fn parse<T: Definition>(
        &self,
        mut reader: impl Read,
        origin: &str,
    ) -> Result<ParsedSource<T>> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| ConfigurationError::parse(T::KIND, origin, e))?;
        self.parse_str(&content, origin)
    }

    pub fn parse_str<T: Definition>(
        &self,
        content: &str,
        origin: &str,
    ) -> Result<ParsedSource<T>> {
        let kind = T::KIND;
        let section = kind.section();
        let mut parsed = ParsedSource {
            origin: origin.to_string(),
            definitions: Vec::new(),
        };

        if is_blank_document(content) {
            warn!(kind = %kind, file = origin, "No configurations found in empty file");
            return Ok(parsed);
        }

        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigurationError::parse(kind, origin, e))?;

        let entries = match document {
            Value::Null => None,
            Value::Mapping(mut root) => root.remove(section),
            other => {
                return Err(ConfigurationError::parse(
                    kind,
                    origin,
                    format!("expected a mapping at document root, found {}", shape(&other)),
                ));
            }
        };

        let entries = match entries {
            None | Some(Value::Null) => {
                warn!(kind = %kind, file = origin, "No '{}' section found in file", section);
                return Ok(parsed);
            }
            Some(Value::Mapping(entries)) => entries,
            Some(other) => {
                return Err(ConfigurationError::parse(
                    kind,
                    origin,
                    format!("'{}' must be a mapping of names, found {}", section, shape(&other)),
                ));
            }
        };

        if entries.is_empty() {
            warn!(kind = %kind, file = origin, "No configurations found in file");
            return Ok(parsed);
        }

        for (key, value) in entries {
            let Some(name) = key_name(&key) else {
                return Err(ConfigurationError::parse(
                    kind,
                    origin,
                    format!("{} names must be scalars, found {}", kind, shape(&key)),
                ));
            };
            let mut definition: T = serde_yaml::from_value(value).map_err(|e| {
                ConfigurationError::parse(kind, origin, format!("{} '{}': {}", kind, name, e))
            })?;
            if definition.name().is_empty() {
                definition.set_name(name.clone());
            }
            parsed.definitions.push((name, definition));
        }

        Ok(parsed)
    }
}

/// True for documents with nothing but whitespace, comments or separators.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Definition name for a mapping key. Numbers and booleans are accepted
/// and keep their YAML spelling (`2024:` names "2024").
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(name) => Some(name.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{DatabaseConfig, EndpointConfig, QueryConfig};

    fn parse<T: Definition>(content: &str) -> Result<ParsedSource<T>> {
        SourceParser::new().parse_str(content, "test.yml")
    }

    #[test]
    fn test_parse_databases() {
        let parsed = parse::<DatabaseConfig>(
            r#"
databases:
  mainDb:
    url: "jdbc:h2:mem:trades"
    username: sa
    driver: org.h2.Driver
    pool:
      maximumPoolSize: 10
"#,
        )
        .unwrap();

        assert_eq!(parsed.definitions.len(), 1);
        let (name, db) = &parsed.definitions[0];
        assert_eq!(name, "mainDb");
        assert_eq!(db.name, "mainDb");
        assert_eq!(db.url, "jdbc:h2:mem:trades");
        assert_eq!(db.username.as_deref(), Some("sa"));
        assert_eq!(db.pool.as_ref().unwrap().maximum_pool_size, Some(10));
    }

    #[test]
    fn test_document_order_preserved() {
        let parsed = parse::<QueryConfig>(
            r#"
queries:
  zeta: { database: d, sql: "select 1" }
  alpha: { database: d, sql: "select 2" }
"#,
        )
        .unwrap();
        let names: Vec<_> = parsed.definitions.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_explicit_name_is_kept() {
        let parsed = parse::<QueryConfig>(
            "queries:\n  key:\n    name: display-name\n    database: d\n    sql: select 1\n",
        )
        .unwrap();
        assert_eq!(parsed.definitions[0].0, "key");
        assert_eq!(parsed.definitions[0].1.name, "display-name");
    }

    #[test]
    fn test_other_section_yields_empty() {
        let parsed = parse::<EndpointConfig>("queries:\n  q1: { database: d, sql: x }\n").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_empty_and_null_sections_yield_empty() {
        assert!(parse::<QueryConfig>("queries: {}\n").unwrap().is_empty());
        assert!(parse::<QueryConfig>("queries:\n").unwrap().is_empty());
        assert!(parse::<QueryConfig>("").unwrap().is_empty());
        assert!(parse::<QueryConfig>("# only a comment\n---\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = parse::<QueryConfig>("queries: [unclosed\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().contains("test.yml"));
    }

    #[test]
    fn test_section_must_be_mapping() {
        let err = parse::<QueryConfig>("queries:\n  - a\n  - b\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = parse::<QueryConfig>("- just\n- a list\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
    }

    #[test]
    fn test_invalid_record_names_definition() {
        let err = parse::<DatabaseConfig>("databases:\n  broken:\n    username: sa\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("broken"));
        assert!(msg.contains("test.yml"));
    }

    #[test]
    fn test_parse_from_reader() {
        let content = b"endpoints:\n  trades:\n    path: /api/trades\n    query: all-trades\n";
        let parsed: ParsedSource<EndpointConfig> =
            SourceParser::new().parse(&content[..], "reader.yml").unwrap();
        assert_eq!(parsed.origin, "reader.yml");
        assert_eq!(parsed.definitions[0].1.query, "all-trades");
    }

    #[test]
    fn test_numeric_and_boolean_names_become_strings() {
        let parsed = parse::<QueryConfig>(
            r#"
queries:
  2024: { database: d, sql: select 1 }
  true: { database: d, sql: select 2 }
"#,
        )
        .unwrap();
        let names: Vec<_> = parsed.definitions.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["2024", "true"]);
        assert_eq!(parsed.definitions[0].1.name, "2024");
    }

    #[test]
    fn test_sequence_name_is_parse_error() {
        let err = parse::<QueryConfig>("queries:\n  ? [a, b]\n  : { database: d, sql: x }\n")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().contains("names must be scalars"));
    }

    #[test]
    fn test_response_keyed_by_status_code() {
        let parsed = parse::<EndpointConfig>(
            r#"
endpoints:
  trade-by-id:
    path: /api/trades/{id}
    query: trade-by-id
    response:
      200: { type: OBJECT }
      404: { type: ERROR, retry: false }
"#,
        )
        .unwrap();
        let response = parsed.definitions[0].1.response.as_ref().unwrap();
        assert_eq!(response["200"]["type"], "OBJECT");
        assert_eq!(response["404"]["retry"], false);
    }
}
