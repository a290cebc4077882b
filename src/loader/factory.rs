//! Backend selection.

use super::{ConfigurationLoader, DatabaseConfigurationLoader, FileConfigurationLoader};
use crate::config::SourceMode;
use crate::error::Result;
use crate::types::{ConfigurationSet, DatabaseConfig, Definitions, EndpointConfig, QueryConfig};
use tracing::info;

/// Holds the one loader chosen for this process and delegates to it.
pub struct LoaderFactory {
    active: Box<dyn ConfigurationLoader>,
}

impl LoaderFactory {
    /// Pick the backend for `mode`.
    ///
    /// The database loader is only required in database mode.
    pub fn new(
        mode: SourceMode,
        file_loader: FileConfigurationLoader,
        database_loader: Option<DatabaseConfigurationLoader>,
    ) -> anyhow::Result<Self> {
        let active: Box<dyn ConfigurationLoader> = match (mode, database_loader) {
            (SourceMode::File, _) => Box::new(file_loader),
            (SourceMode::Database, Some(loader)) => Box::new(loader),
            (SourceMode::Database, None) => {
                anyhow::bail!("Configuration source is 'database' but no database loader is available")
            }
        };
        info!(source = %mode, "Configuration source selected");
        Ok(Self { active })
    }

    /// Wrap an already chosen loader.
    pub fn from_loader(loader: Box<dyn ConfigurationLoader>) -> Self {
        Self { active: loader }
    }

    pub fn loader(&self) -> &dyn ConfigurationLoader {
        self.active.as_ref()
    }
}

impl ConfigurationLoader for LoaderFactory {
    fn source_mode(&self) -> SourceMode {
        self.active.source_mode()
    }

    fn load_databases(&self) -> Result<Definitions<DatabaseConfig>> {
        self.active.load_databases()
    }

    fn load_queries(&self) -> Result<Definitions<QueryConfig>> {
        self.active.load_queries()
    }

    fn load_endpoints(&self) -> Result<Definitions<EndpointConfig>> {
        self.active.load_endpoints()
    }

    fn load_all(&self) -> Result<ConfigurationSet> {
        self.active.load_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;
    use crate::db::Database;
    use crate::resolve::ResourceResolver;

    fn file_loader() -> FileConfigurationLoader {
        FileConfigurationLoader::from_settings(
            ResourceResolver::new("/nonexistent"),
            &SourceSettings::default(),
        )
    }

    #[test]
    fn test_file_mode_selects_file_loader() {
        let factory = LoaderFactory::new(SourceMode::File, file_loader(), None).unwrap();
        assert_eq!(factory.source_mode(), SourceMode::File);
    }

    #[test]
    fn test_database_mode_selects_database_loader() {
        let db = Database::open_in_memory().unwrap();
        let factory = LoaderFactory::new(
            SourceMode::Database,
            file_loader(),
            Some(DatabaseConfigurationLoader::new(db)),
        )
        .unwrap();
        assert_eq!(factory.loader().source_mode(), SourceMode::Database);
    }

    #[test]
    fn test_database_mode_without_store_fails() {
        assert!(LoaderFactory::new(SourceMode::Database, file_loader(), None).is_err());
    }
}
