use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::ServiceError;

/// A single configuration entry as returned by [`Handler::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub module: String,
    pub key: String,
    pub value: String,
}

/// Key/value access to one module of one backend.
///
/// Implementors provide the fallible `try_*` primitives and `set`. The
/// `get`, `remove` and `list` defaults log failures and degrade to an empty
/// value, a no-op and an empty list respectively.
#[async_trait]
pub trait Handler: Send + Sync {
    fn module(&self) -> &str;

    async fn try_get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError>;
    async fn try_remove(&self, key: &str) -> Result<(), ServiceError>;
    async fn try_list(&self) -> Result<Vec<Item>, ServiceError>;

    /// Value for `key`, or an empty string when absent or unreadable.
    async fn get(&self, key: &str) -> String {
        match self.try_get(key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(module = self.module(), key, error = %e, "config get failed");
                String::new()
            }
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key).await {
            warn!(module = self.module(), key, error = %e, "config remove failed");
        }
    }

    async fn list(&self) -> Vec<Item> {
        match self.try_list().await {
            Ok(items) => items,
            Err(e) => {
                warn!(module = self.module(), error = %e, "config list failed");
                Vec::new()
            }
        }
    }
}

/// Keys shared by every backend must be non-empty.
pub(crate) fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.is_empty() {
        return Err(ServiceError::Validation("key must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Backend whose primitives always fail, to exercise the degrading defaults.
    struct Broken {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Handler for Broken {
        fn module(&self) -> &str { "broken" }

        async fn try_get(&self, _key: &str) -> Result<Option<String>, ServiceError> {
            self.calls.lock().unwrap().push("get");
            Err(ServiceError::Db("down".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), ServiceError> {
            Err(ServiceError::Db("down".into()))
        }

        async fn try_remove(&self, _key: &str) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push("remove");
            Err(ServiceError::Db("down".into()))
        }

        async fn try_list(&self) -> Result<Vec<Item>, ServiceError> {
            self.calls.lock().unwrap().push("list");
            Err(ServiceError::Db("down".into()))
        }
    }

    #[tokio::test]
    async fn defaults_degrade_on_error() {
        let h = Broken { calls: Mutex::new(Vec::new()) };
        assert_eq!(h.get("a").await, "");
        h.remove("a").await;
        assert!(h.list().await.is_empty());
        assert!(h.set("a", "b").await.is_err());
        assert_eq!(*h.calls.lock().unwrap(), vec!["get", "remove", "list"]);
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(validate_key("").is_err());
        assert!(validate_key("port").is_ok());
    }
}
