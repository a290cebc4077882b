//! Configuration loaders.
//!
//! Every backend produces the same [`ConfigurationSet`] through the
//! [`ConfigurationLoader`] trait; callers never see which one is active.

mod database;
mod factory;
mod file;

pub use database::DatabaseConfigurationLoader;
pub use factory::LoaderFactory;
pub use file::FileConfigurationLoader;

use crate::config::SourceMode;
use crate::error::Result;
use crate::types::{ConfigurationSet, DatabaseConfig, Definitions, EndpointConfig, QueryConfig};

/// A source of database, query and endpoint definitions.
pub trait ConfigurationLoader: Send + Sync {
    /// The backend this loader reads from.
    fn source_mode(&self) -> SourceMode;

    fn load_databases(&self) -> Result<Definitions<DatabaseConfig>>;

    fn load_queries(&self) -> Result<Definitions<QueryConfig>>;

    fn load_endpoints(&self) -> Result<Definitions<EndpointConfig>>;

    /// Load all three kinds, stopping at the first error.
    fn load_all(&self) -> Result<ConfigurationSet> {
        Ok(ConfigurationSet {
            databases: self.load_databases()?,
            queries: self.load_queries()?,
            endpoints: self.load_endpoints()?,
        })
    }
}
