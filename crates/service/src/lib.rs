//! Module-scoped key/value configuration over interchangeable backends.
//! - `Storage` describes a backend: a `key=value` properties file or the
//!   `EASY_CONFIG_ITEMS` table of a MySQL, PostgreSQL or SQLite database.
//! - `initialize` turns a storage and a module name into a boxed `Handler`.
//! - `Handler` exposes get/set/remove/list for that one module.

pub mod errors;
pub mod handler;
pub mod storage;
pub mod db;
pub mod file;
#[cfg(test)]
pub mod test_support;

pub use configs::DbDriver;
pub use errors::ServiceError;
pub use handler::{Handler, Item};
pub use storage::{initialize, PropertiesStorage, RelationalStorage, Storage, DEFAULT_MODULE};
