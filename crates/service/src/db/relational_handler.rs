use async_trait::async_trait;
use dashmap::DashMap;
use models::config_item;
use sea_orm::DatabaseConnection;
use tracing::{debug, error, instrument};

use crate::errors::ServiceError;
use crate::handler::{validate_key, Handler, Item};

/// Which statement a [`RelationalHandler::upsert`] ended up issuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Inserted,
    Updated,
}

/// Handler over the `EASY_CONFIG_ITEMS` table, filtered by the `module` column.
///
/// Values read through `get` are cached per key until this handler writes
/// or removes that key. The cache has no expiry: changes made by other
/// processes are not seen for keys already cached.
pub struct RelationalHandler {
    module: String,
    db: DatabaseConnection,
    cache: DashMap<String, String>,
}

impl RelationalHandler {
    pub fn new(db: DatabaseConnection, module: &str) -> Self {
        Self { module: module.to_string(), db, cache: DashMap::new() }
    }

    /// Update the row when `(module, key)` exists, insert it otherwise.
    #[instrument(skip(self, value), fields(module = %self.module))]
    pub async fn upsert(&self, key: &str, value: &str) -> Result<SetOutcome, ServiceError> {
        validate_key(key)?;
        config_item::validate(&self.module, key, value)?;

        let outcome = if config_item::exists(&self.db, &self.module, key).await? {
            config_item::update_value(&self.db, &self.module, key, value).await?;
            SetOutcome::Updated
        } else {
            config_item::insert(&self.db, &self.module, key, value).await?;
            SetOutcome::Inserted
        };
        self.cache.remove(key);
        debug!(?outcome, "config item written");
        Ok(outcome)
    }

    /// Delete the row for `key`; returns the number of rows removed.
    pub async fn delete(&self, key: &str) -> Result<u64, ServiceError> {
        let res = config_item::delete(&self.db, &self.module, key).await;
        self.cache.remove(key);
        Ok(res?)
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Handler for RelationalHandler {
    fn module(&self) -> &str {
        &self.module
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        if let Some(v) = self.cache.get(key) {
            return Ok(Some(v.value().clone()));
        }
        let value = config_item::find_value(&self.db, &self.module, key).await?;
        if let Some(v) = &value {
            self.cache.insert(key.to_string(), v.clone());
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        match self.upsert(key, value).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(module = %self.module, key, error = %e, "config set failed");
                Err(e)
            }
        }
    }

    async fn try_remove(&self, key: &str) -> Result<(), ServiceError> {
        let removed = self.delete(key).await?;
        debug!(module = %self.module, key, removed, "config item removed");
        Ok(())
    }

    async fn try_list(&self) -> Result<Vec<Item>, ServiceError> {
        let rows = config_item::list_by_module(&self.db, &self.module).await?;
        Ok(rows
            .into_iter()
            .map(|r| Item { module: r.module, key: r.name, value: r.value })
            .collect())
    }
}
