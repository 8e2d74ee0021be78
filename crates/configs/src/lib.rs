use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "easy-config.toml";
pub const DEFAULT_PROPERTIES_PATH: &str = "easy-config.properties";
pub const DEFAULT_MODULE: &str = "DEFAULT";
pub const PASSWORD_ENV: &str = "EASY_CONFIG_DB_PASSWORD";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Which backend holds the configuration items.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    Properties {
        #[serde(default)]
        path: String,
    },
    Relational(DatabaseConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Properties { path: DEFAULT_PROPERTIES_PATH.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    #[default]
    Mysql,
    #[serde(alias = "postgresql")]
    Postgres,
    Sqlite,
}

impl DbDriver {
    pub fn default_port(self) -> u16 {
        match self {
            DbDriver::Mysql => 3306,
            DbDriver::Postgres => 5432,
            DbDriver::Sqlite => 0,
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            DbDriver::Mysql => "mysql",
            DbDriver::Postgres => "postgres",
            DbDriver::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub driver: DbDriver,
    #[serde(default = "default_host")]
    pub host: String,
    /// 0 means the driver's default port.
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Database name, or the database file path for SQLite.
    pub database: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DbDriver::default(),
            host: default_host(),
            port: 0,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config file {path}: {e}"))?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `$CONFIG_PATH` (or `easy-config.toml`) and validate it. A missing
    /// file yields the built-in defaults instead of an error.
    pub fn load_or_default() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        if self.module.trim().is_empty() {
            self.module = DEFAULT_MODULE.to_string();
        }
        self.storage.normalize_and_validate()
    }
}

impl StorageConfig {
    pub fn normalize_and_validate(&mut self) -> Result<()> {
        match self {
            StorageConfig::Properties { path } => {
                if path.trim().is_empty() {
                    return Err(anyhow!("storage.path is empty; the properties backend needs a file path"));
                }
                Ok(())
            }
            StorageConfig::Relational(db) => {
                db.normalize_from_env();
                db.validate()
            }
        }
    }
}

impl DatabaseConfig {
    /// Fill the default port and take the password from the environment when absent.
    pub fn normalize_from_env(&mut self) {
        if self.port == 0 {
            self.port = self.driver.default_port();
        }
        if self.password.is_empty() {
            if let Ok(pass) = std::env::var(PASSWORD_ENV) {
                self.password = pass;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(anyhow!("storage.database is empty"));
        }
        if self.driver != DbDriver::Sqlite && self.host.trim().is_empty() {
            return Err(anyhow!("storage.host is empty"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("storage.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("storage.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("storage timeouts must be positive seconds"));
        }
        Ok(())
    }

    /// Connection URL understood by sqlx.
    pub fn url(&self) -> String {
        match self.driver {
            DbDriver::Sqlite => format!("sqlite://{}?mode=rwc", self.database),
            driver => {
                let port = if self.port == 0 { driver.default_port() } else { self.port };
                format!(
                    "{}://{}:{}@{}:{}/{}",
                    driver.scheme(),
                    self.user,
                    self.password,
                    self.host,
                    port,
                    self.database
                )
            }
        }
    }

    /// Same as `url` with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        if self.password.is_empty() {
            return self.url();
        }
        self.url().replacen(&format!(":{}@", self.password), ":***@", 1)
    }
}
