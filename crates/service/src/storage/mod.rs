//! Backend descriptors and the `initialize` entry point.
//!
//! A [`Storage`] only describes where configuration lives; calling
//! [`initialize`] connects to it and yields a [`Handler`] bound to a module.

pub mod properties_file;

use std::path::{Path, PathBuf};

use configs::{DatabaseConfig, DbDriver, StorageConfig};
use tracing::info;

use crate::db::relational_handler::RelationalHandler;
use crate::errors::ServiceError;
use crate::file::properties_handler::PropertiesHandler;
use crate::handler::Handler;

pub use configs::DEFAULT_MODULE;
pub use migration::TABLE_NAME;

/// Flat `key=value` file.
#[derive(Debug, Clone)]
pub struct PropertiesStorage {
    path: PathBuf,
}

impl PropertiesStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn init(&self, module: &str) -> Result<Box<dyn Handler>, ServiceError> {
        let handler = PropertiesHandler::open(&self.path, module).await?;
        Ok(Box::new(handler))
    }
}

/// Table `EASY_CONFIG_ITEMS` in a MySQL, PostgreSQL or SQLite database.
#[derive(Debug, Clone)]
pub struct RelationalStorage {
    config: DatabaseConfig,
    table: &'static str,
}

impl RelationalStorage {
    /// MySQL storage; use [`RelationalStorage::with_driver`] for other servers.
    pub fn new(host: &str, port: u16, user: &str, password: &str, database: &str) -> Self {
        Self::from_config(DatabaseConfig {
            driver: DbDriver::Mysql,
            host: host.to_string(),
            port,
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
            ..Default::default()
        })
    }

    /// SQLite database file at `path`, created on first use.
    pub fn sqlite<P: AsRef<Path>>(path: P) -> Self {
        Self::from_config(DatabaseConfig {
            driver: DbDriver::Sqlite,
            database: path.as_ref().display().to_string(),
            ..Default::default()
        })
    }

    pub fn from_config(config: DatabaseConfig) -> Self {
        Self { config, table: TABLE_NAME }
    }

    pub fn with_driver(mut self, driver: DbDriver) -> Self {
        self.config.driver = driver;
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn table(&self) -> &str {
        self.table
    }

    async fn init(&self, module: &str) -> Result<Box<dyn Handler>, ServiceError> {
        let db = models::db::connect_with_config(&self.config)
            .await
            .map_err(|e| ServiceError::Db(format!("connect {}: {e:#}", self.config.redacted_url())))?;
        models::db::ensure_schema(&db)
            .await
            .map_err(|e| ServiceError::Db(format!("prepare table {}: {e:#}", self.table)))?;
        Ok(Box::new(RelationalHandler::new(db, module)))
    }
}

#[derive(Debug, Clone)]
pub enum Storage {
    Properties(PropertiesStorage),
    Relational(RelationalStorage),
}

impl Storage {
    pub fn properties<P: Into<PathBuf>>(path: P) -> Self {
        Storage::Properties(PropertiesStorage::new(path))
    }

    pub fn from_config(cfg: &StorageConfig) -> Self {
        match cfg {
            StorageConfig::Properties { path } => Storage::properties(path),
            StorageConfig::Relational(db) => Storage::Relational(RelationalStorage::from_config(db.clone())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Storage::Properties(_) => "properties",
            Storage::Relational(_) => "relational",
        }
    }

    async fn init(&self, module: &str) -> Result<Box<dyn Handler>, ServiceError> {
        match self {
            Storage::Properties(s) => s.init(module).await,
            Storage::Relational(s) => s.init(module).await,
        }
    }
}

impl From<PropertiesStorage> for Storage {
    fn from(s: PropertiesStorage) -> Self { Storage::Properties(s) }
}

impl From<RelationalStorage> for Storage {
    fn from(s: RelationalStorage) -> Self { Storage::Relational(s) }
}

/// Blank module names fall back to [`DEFAULT_MODULE`].
pub fn normalize_module(module: &str) -> &str {
    if module.trim().is_empty() { DEFAULT_MODULE } else { module }
}

/// Build a handler for `module` on top of `storage`.
pub async fn initialize(storage: &Storage, module: &str) -> Result<Box<dyn Handler>, ServiceError> {
    let module = normalize_module(module);
    let handler = storage.init(module).await?;
    info!(storage = storage.kind(), module, event = "handler_ready", "config handler initialized");
    Ok(handler)
}
