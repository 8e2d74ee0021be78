#![cfg(test)]
use std::path::PathBuf;

use crate::db::relational_handler::RelationalHandler;
use crate::storage::RelationalStorage;

pub fn temp_properties_path() -> PathBuf {
    std::env::temp_dir().join(format!("easy_config_{}.properties", uuid::Uuid::new_v4()))
}

pub fn temp_sqlite_path() -> PathBuf {
    std::env::temp_dir().join(format!("easy_config_{}.db", uuid::Uuid::new_v4()))
}

/// Relational handler over a fresh SQLite file with the table created.
pub async fn sqlite_handler(module: &str) -> Result<(RelationalHandler, PathBuf), anyhow::Error> {
    let path = temp_sqlite_path();
    let storage = RelationalStorage::sqlite(&path);
    let db = models::db::connect_with_config(storage.config()).await?;
    models::db::ensure_schema(&db).await?;
    Ok((RelationalHandler::new(db, module), path))
}
