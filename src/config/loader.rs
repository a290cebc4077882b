//! Settings loader with tier-based merging.
//!
//! Tiers, lowest to highest priority:
//! 1. built-in defaults,
//! 2. the settings file located through the [`ResourceResolver`],
//! 3. environment variables.
//!
//! Mappings are merged field by field; sequences and scalars are replaced.
//! Keys in the settings file may be written in camelCase (`loadFromYaml`)
//! or snake_case (`load_from_yaml`).

use super::types::{Settings, SourceMode};
use crate::resolve::{ResourceOrigin, ResourceResolver};
use anyhow::{Context, Result, anyhow};
use heck::ToSnakeCase;
use serde_yaml::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings file looked up when nothing else is specified.
pub const DEFAULT_SETTINGS_FILE: &str = "application.yml";

/// Environment variable naming an explicit settings file.
pub const ENV_SETTINGS_FILE: &str = "GENERIC_CONFIG_FILE";
pub const ENV_SOURCE: &str = "GENERIC_CONFIG_SOURCE";
pub const ENV_DIRECTORIES: &str = "GENERIC_CONFIG_DIRECTORIES";
pub const ENV_DB_PATH: &str = "GENERIC_CONFIG_DB_PATH";

/// Loads [`Settings`] and remembers where they came from.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    settings: Settings,
    settings_origin: Option<ResourceOrigin>,
}

impl SettingsLoader {
    /// Load settings using the process environment.
    ///
    /// `explicit` (e.g. from `--config`) takes precedence over
    /// `GENERIC_CONFIG_FILE`; a missing explicit file is an error.
    pub fn load(resolver: &ResourceResolver, explicit: Option<&str>) -> Result<Self> {
        Self::load_with_env(resolver, explicit, |key| std::env::var(key).ok())
    }

    /// Load settings with a custom environment lookup.
    pub fn load_with_env<F>(
        resolver: &ResourceResolver,
        explicit: Option<&str>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested = explicit.map(str::to_string).or_else(|| env(ENV_SETTINGS_FILE));
        let file_name = requested.as_deref().unwrap_or(DEFAULT_SETTINGS_FILE);

        let mut tiers = vec![
            serde_yaml::to_value(Settings::default()).context("Failed to encode default settings")?,
        ];

        let settings_origin = match resolver.resolve(file_name) {
            Some(resource) => {
                let origin = resource.origin().clone();
                let content = resource
                    .into_string()
                    .with_context(|| format!("Failed to read settings file {}", origin))?;
                let value: Value = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse settings file {}", origin))?;
                info!(file = %origin, "Using settings file");
                tiers.push(normalize_keys(value));
                Some(origin)
            }
            None if requested.is_some() => {
                return Err(anyhow!("Settings file not found: {}", file_name));
            }
            None => {
                warn!(file = file_name, "Settings file not found, using built-in defaults");
                None
            }
        };

        let merged = tiers.into_iter().fold(Value::Null, overlay);
        let mut settings: Settings =
            serde_yaml::from_value(merged).context("Invalid settings document")?;

        apply_env_overrides(&mut settings, &env)?;
        settings.fill_empty_lists();

        info!(
            source = %settings.config.source,
            directories = ?settings.config.directories,
            database_patterns = ?settings.config.patterns.databases,
            query_patterns = ?settings.config.patterns.queries,
            endpoint_patterns = ?settings.config.patterns.endpoints,
            "Configuration settings loaded"
        );

        Ok(Self {
            settings,
            settings_origin,
        })
    }

    /// Get the loaded settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable access to the settings (for CLI overrides).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the loader and return the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Where the settings file was found, if one was.
    pub fn settings_origin(&self) -> Option<&ResourceOrigin> {
        self.settings_origin.as_ref()
    }
}

/// Apply environment variable overrides to settings.
fn apply_env_overrides<F>(settings: &mut Settings, env: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(source) = env(ENV_SOURCE) {
        settings.config.source = source.parse::<SourceMode>()?;
    }

    if let Some(dirs) = env(ENV_DIRECTORIES) {
        settings.config.directories = dirs
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(db_path) = env(ENV_DB_PATH) {
        settings.database.path = PathBuf::from(db_path);
    }

    Ok(())
}

/// Rewrite every mapping key to snake_case so camelCase files line up
/// with the defaults tier.
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(key) => Value::String(key.to_snake_case()),
                        other => other,
                    };
                    (key, normalize_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Merge `top` over `base`. Null in `top` keeps `base`.
fn overlay(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Mapping(mut base_map), Value::Mapping(top_map)) => {
            for (key, top_value) in top_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => overlay(base_value, top_value),
                    None => top_value,
                };
                base_map.insert(key, merged);
            }
            Value::Mapping(base_map)
        }
        (base, Value::Null) => base,
        (_, top) => top,
    }
}
