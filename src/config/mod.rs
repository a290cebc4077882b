//! Process settings.
//!
//! Consolidates settings from three tiers with field-by-field YAML merging:
//! 1. **Defaults** - built in, mirrored by the bundled `config/application.yml`
//! 2. **Settings file** - `--config`, `GENERIC_CONFIG_FILE` or `application.yml`,
//!    located through the resource resolver
//! 3. **Environment** - variables below
//!
//! ## Environment Variables
//! - `GENERIC_CONFIG_FILE` - Settings file to resolve
//! - `GENERIC_CONFIG_SOURCE` - `yaml` or `database`
//! - `GENERIC_CONFIG_DIRECTORIES` - Comma separated directories to scan
//! - `GENERIC_CONFIG_DB_PATH` - SQLite configuration store path

mod loader;
mod types;

pub use loader::{
    DEFAULT_SETTINGS_FILE, ENV_DB_PATH, ENV_DIRECTORIES, ENV_SETTINGS_FILE, ENV_SOURCE,
    SettingsLoader,
};
pub use types::*;
