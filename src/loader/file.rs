//! File backend: scan, resolve, parse and merge YAML sources.

use super::ConfigurationLoader;
use crate::config::{PatternSettings, SourceMode, SourceSettings};
use crate::error::{ConfigurationError, Result};
use crate::merge::merge_sources;
use crate::parser::{ParsedSource, SourceParser};
use crate::paths::display_path;
use crate::pattern::PatternSet;
use crate::resolve::ResourceResolver;
use crate::scanner::{DirectoryScanner, SourceDescriptor};
use crate::types::{DatabaseConfig, Definition, Definitions, EndpointConfig, QueryConfig};
use tracing::{error, info};

/// Loads definitions from YAML files found by a [`DirectoryScanner`].
#[derive(Debug, Clone)]
pub struct FileConfigurationLoader {
    resolver: ResourceResolver,
    scanner: DirectoryScanner,
    parser: SourceParser,
    patterns: PatternSettings,
}

impl FileConfigurationLoader {
    pub fn new(
        resolver: ResourceResolver,
        scanner: DirectoryScanner,
        parser: SourceParser,
        patterns: PatternSettings,
    ) -> Self {
        Self {
            resolver,
            scanner,
            parser,
            patterns,
        }
    }

    /// Loader scanning `settings.directories` relative to the resolver's
    /// working directory.
    pub fn from_settings(resolver: ResourceResolver, settings: &SourceSettings) -> Self {
        let scanner = DirectoryScanner::new(resolver.working_dir(), settings.directories.clone());
        Self::new(resolver, scanner, SourceParser::new(), settings.patterns.clone())
    }

    pub fn scanner(&self) -> &DirectoryScanner {
        &self.scanner
    }

    fn load_kind<T: Definition>(&self) -> Result<Definitions<T>> {
        let kind = T::KIND;
        let pattern_sources = self.patterns.for_kind(kind);
        let patterns = PatternSet::new(pattern_sources);

        info!(kind = %kind, "Loading {} configurations from files", kind);
        let sources = self.scanner.scan(&patterns);

        if sources.is_empty() {
            error!(
                kind = %kind,
                directories = ?self.scanner.directories(),
                patterns = ?pattern_sources,
                "FATAL CONFIGURATION ERROR: no {} configuration files found", kind
            );
            return Err(ConfigurationError::NoSourcesFound {
                kind,
                directories: self.scanner.directories().to_vec(),
                patterns: pattern_sources.to_vec(),
            });
        }

        let parsed = sources.iter().map(|descriptor| {
            self.read_source::<T>(descriptor).inspect_err(|e| {
                error!(
                    kind = %kind,
                    file = %descriptor,
                    error = %e,
                    "FATAL CONFIGURATION ERROR: Failed to load {} configurations", kind
                );
            })
        });

        merge_sources(parsed)
    }

    /// Open the scanned file by its real path and parse it. The display form
    /// of the path only names the source in diagnostics.
    fn read_source<T: Definition>(
        &self,
        descriptor: &SourceDescriptor,
    ) -> Result<ParsedSource<T>> {
        let kind = T::KIND;
        let location = display_path(&descriptor.path);
        info!(kind = %kind, file = %location, "Processing {} file", kind);
        let resource = self.resolver.open_path(&descriptor.path).ok_or_else(|| {
            ConfigurationError::Resource {
                kind,
                source_id: location.clone(),
            }
        })?;
        self.parser.parse::<T>(resource, &location)
    }
}

impl ConfigurationLoader for FileConfigurationLoader {
    fn source_mode(&self) -> SourceMode {
        SourceMode::File
    }

    fn load_databases(&self) -> Result<Definitions<DatabaseConfig>> {
        self.load_kind()
    }

    fn load_queries(&self) -> Result<Definitions<QueryConfig>> {
        self.load_kind()
    }

    fn load_endpoints(&self) -> Result<Definitions<EndpointConfig>> {
        self.load_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    fn loader_for(temp: &TempDir, dirs: &[&str]) -> FileConfigurationLoader {
        let resolver = ResourceResolver::new(temp.path());
        let settings = SourceSettings {
            directories: dirs.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        };
        FileConfigurationLoader::from_settings(resolver, &settings)
    }

    #[test]
    fn test_loads_single_database_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cfg")).unwrap();
        fs::write(
            temp.path().join("cfg/main-database.yml"),
            "databases:\n  mainDb:\n    url: jdbc:h2:mem:main\n",
        )
        .unwrap();

        let loader = loader_for(&temp, &["./cfg"]);
        let databases = loader.load_databases().unwrap();
        assert_eq!(databases.len(), 1);
        assert_eq!(databases.get("mainDb").unwrap().url, "jdbc:h2:mem:main");
        assert_eq!(loader.source_mode(), SourceMode::File);
    }

    #[test]
    fn test_no_matching_files_is_fatal() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cfg")).unwrap();
        fs::write(temp.path().join("cfg/readme.txt"), "not yaml").unwrap();

        let err = loader_for(&temp, &["./cfg"]).load_queries().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoSourcesFound);
        assert!(err.to_string().contains("*-query.yml"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cfg")).unwrap();
        fs::write(temp.path().join("cfg/bad-api.yml"), "endpoints: [unclosed\n").unwrap();

        let err = loader_for(&temp, &["./cfg"]).load_endpoints().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseError);
        assert!(err.to_string().contains("bad-api.yml"));
    }

    #[test]
    fn test_vanished_source_is_resource_error() {
        let temp = TempDir::new().unwrap();
        let loader = loader_for(&temp, &["./cfg"]);
        let descriptor = SourceDescriptor {
            path: temp.path().join("cfg/gone-query.yml"),
            directory: "./cfg".into(),
            file_name: "gone-query.yml".into(),
            matched_patterns: vec!["*-query.yml".into()],
        };

        let err = loader.read_source::<QueryConfig>(&descriptor).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ResourceUnavailable);
        assert!(err.to_string().contains("gone-query.yml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_in_file_name_is_opened() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("cfg")).unwrap();
        fs::write(
            temp.path().join("cfg").join("a\\b-query.yml"),
            "queries:\n  q1: { database: d, sql: select 1 }\n",
        )
        .unwrap();

        let queries = loader_for(&temp, &["./cfg"]).load_queries().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries.get("q1").unwrap().sql, "select 1");
    }
}
