//! Startup wiring.
//!
//! Builds every component explicitly from [`Settings`] in dependency order and
//! loads the configuration set once. Any fatal error aborts startup.

use crate::config::{Settings, SourceMode};
use crate::db::Database;
use crate::db::import::{ImportMode, ImportResult};
use crate::loader::{
    ConfigurationLoader, DatabaseConfigurationLoader, FileConfigurationLoader, LoaderFactory,
};
use crate::paths::absolute_normalized;
use crate::resolve::ResourceResolver;
use crate::types::ConfigurationSet;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Load the configuration set for this process.
///
/// Relative directories and the store path resolve against the current
/// working directory.
pub fn initialize(settings: &Settings) -> Result<ConfigurationSet> {
    let resolver = ResourceResolver::for_process().context("Failed to read working directory")?;
    initialize_with(resolver, settings)
}

/// Load the configuration set using an explicit resolver.
pub fn initialize_with(resolver: ResourceResolver, settings: &Settings) -> Result<ConfigurationSet> {
    let mode = settings.config.source;
    info!(source = %mode, directories = ?settings.config.directories, "Initializing configuration");

    let file_loader = FileConfigurationLoader::from_settings(resolver.clone(), &settings.config);

    let database_loader = match mode {
        SourceMode::File => None,
        SourceMode::Database => {
            let db = open_store(&resolver, settings)?;
            if settings.config.load_from_yaml {
                seed_from_files(&db, &file_loader)?;
            }
            Some(DatabaseConfigurationLoader::new(db))
        }
    };

    let factory = LoaderFactory::new(mode, file_loader, database_loader)?;
    let set = factory.load_all()?;

    info!(
        databases = set.databases.len(),
        queries = set.queries.len(),
        endpoints = set.endpoints.len(),
        "Configuration loaded"
    );

    if settings.validation.run_on_startup || settings.validation.validate_only {
        log_unresolved_references(&set);
    }

    Ok(set)
}

/// Open the relational store named by `settings.database`.
pub fn open_store(resolver: &ResourceResolver, settings: &Settings) -> Result<Database> {
    let path = absolute_normalized(resolver.working_dir(), &settings.database.path);
    info!(path = %path.display(), "Opening configuration database");
    Database::open(&path, settings.database.create_if_missing)
}

/// Import file definitions into an empty store.
///
/// Returns `None` when the store already holds rows; nothing is written then.
pub fn seed_from_files(
    db: &Database,
    file_loader: &FileConfigurationLoader,
) -> Result<Option<ImportResult>> {
    if !db.is_empty()? {
        info!("Configuration database already populated, skipping YAML import");
        return Ok(None);
    }

    info!("Configuration database is empty, importing definitions from YAML files");
    let set = file_loader.load_all()?;
    let result = db.import_configuration_set(&set, ImportMode::Fresh)?;
    Ok(Some(result))
}

/// Log dangling cross references at WARN. Returns how many were found.
pub fn log_unresolved_references(set: &ConfigurationSet) -> usize {
    let unresolved = set.unresolved_references();
    for reference in &unresolved {
        warn!(
            kind = %reference.kind,
            name = %reference.name,
            field = reference.field,
            target = %reference.target,
            "Unresolved configuration reference: {}", reference
        );
    }
    if unresolved.is_empty() {
        info!("All configuration references resolved");
    }
    unresolved.len()
}
