
/// Row-level operations on the config item table
pub mod config_item_tests;

use configs::{DatabaseConfig, DbDriver};
use sea_orm::DatabaseConnection;

/// Fresh SQLite database file with the schema applied.
pub(crate) async fn sqlite_db() -> anyhow::Result<(DatabaseConnection, std::path::PathBuf)> {
    let path = std::env::temp_dir().join(format!("models_{}.db", uuid::Uuid::new_v4()));
    let cfg = DatabaseConfig {
        driver: DbDriver::Sqlite,
        database: path.display().to_string(),
        ..Default::default()
    };
    let db = crate::db::connect_with_config(&cfg).await?;
    crate::db::ensure_schema(&db).await?;
    Ok((db, path))
}
