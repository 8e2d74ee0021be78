use std::time::Duration;

use configs::{DatabaseConfig, DbDriver};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

/// Open a pool described by `cfg` and make sure the server answers.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    // SQLite allows a single writer; more pooled connections only produce SQLITE_BUSY.
    let max = if cfg.driver == DbDriver::Sqlite { 1 } else { cfg.max_connections };
    let mut opt = ConnectOptions::new(cfg.url());
    opt.max_connections(max)
        .min_connections(cfg.min_connections.min(max))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);

    let db = Database::connect(opt).await?;
    db.ping().await?;
    info!(url = %cfg.redacted_url(), event = "db_connected", "successfully connected to the database");
    Ok(db)
}

/// Create the config table and its unique index when they are missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    migration::Migrator::up(db, None).await?;
    Ok(())
}
