use std::{collections::HashMap, path::{Path, PathBuf}};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::errors::ServiceError;
use crate::handler::{validate_key, Handler, Item};
use crate::storage::properties_file;

/// Handler over a `key=value` file where every key is stored as `module.key`.
///
/// Reads are served from the snapshot loaded at open time plus this
/// handler's own writes. Set/Remove hold the snapshot's write lock while the
/// file is rewritten, so rewrites through one handler never interleave.
/// Other processes writing the same file are not coordinated with.
pub struct PropertiesHandler {
    module: String,
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl PropertiesHandler {
    /// Load the file at `path`; a missing file starts an empty configuration.
    ///
    /// `module` becomes the key prefix in the file, so it must survive a
    /// rewrite and reload: non-empty, single-line, no `=`, no surrounding
    /// whitespace.
    pub async fn open<P: Into<PathBuf>>(path: P, module: &str) -> Result<Self, ServiceError> {
        Self::check_segment("module", module)?;
        let path = path.into();
        let entries = properties_file::load(&path).await?;
        debug!(path = %path.display(), module, entries = entries.len(), "properties loaded");
        Ok(Self { module: module.to_string(), path, entries: RwLock::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_key(&self, key: &str) -> String {
        format!("{}.{}", self.module, key)
    }

    /// Rules shared by the module and the key, the two halves of a file key.
    fn check_segment(what: &str, s: &str) -> Result<(), ServiceError> {
        if s.is_empty() {
            return Err(ServiceError::Validation(format!("{what} must not be empty")));
        }
        if s.contains('=') {
            return Err(ServiceError::Validation(format!("{what} must not contain '='")));
        }
        if s.contains(['\n', '\r']) {
            return Err(ServiceError::Validation(format!("{what} must be single-line")));
        }
        // keys are trimmed on load
        if s.trim() != s {
            return Err(ServiceError::Validation(format!("{what} must not start or end with whitespace")));
        }
        Ok(())
    }

    fn validate(key: &str, value: &str) -> Result<(), ServiceError> {
        validate_key(key)?;
        Self::check_segment("key", key)?;
        if value.contains(['\n', '\r']) {
            return Err(ServiceError::Validation("value must be single-line".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Handler for PropertiesHandler {
    fn module(&self) -> &str {
        &self.module
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&self.file_key(key)).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        Self::validate(key, value)?;
        let file_key = self.file_key(key);
        let mut entries = self.entries.write().await;
        if let Err(e) = properties_file::update(&self.path, &file_key, value).await {
            error!(path = %self.path.display(), key = %file_key, error = %e, "properties update failed");
            return Err(e);
        }
        entries.insert(file_key, value.to_string());
        Ok(())
    }

    async fn try_remove(&self, key: &str) -> Result<(), ServiceError> {
        let file_key = self.file_key(key);
        let mut entries = self.entries.write().await;
        let dropped = properties_file::remove(&self.path, &file_key).await?;
        debug!(key = %file_key, dropped, "properties key removed");
        entries.remove(&file_key);
        Ok(())
    }

    async fn try_list(&self) -> Result<Vec<Item>, ServiceError> {
        let prefix = format!("{}.", self.module);
        let entries = self.entries.read().await;
        let mut items: Vec<Item> = entries
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(&prefix).map(|key| Item {
                    module: self.module.clone(),
                    key: key.to_string(),
                    value: v.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(items)
    }
}
