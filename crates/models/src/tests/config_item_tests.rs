use crate::config_item::{self, MAX_MODULE_LEN, MAX_NAME_LEN, MAX_VALUE_LEN};
use crate::errors::ModelError;
use anyhow::Result;

#[tokio::test]
async fn insert_then_find_and_update() -> Result<()> {
    let (db, path) = super::sqlite_db().await?;

    assert!(!config_item::exists(&db, "svc", "timeout").await?);
    assert_eq!(config_item::find_value(&db, "svc", "timeout").await?, None);

    let row = config_item::insert(&db, "svc", "timeout", "30").await?;
    assert_eq!(row.module, "svc");
    assert_eq!(row.name, "timeout");
    assert!(config_item::exists(&db, "svc", "timeout").await?);

    let affected = config_item::update_value(&db, "svc", "timeout", "60").await?;
    assert_eq!(affected, 1);
    assert_eq!(config_item::find_value(&db, "svc", "timeout").await?.as_deref(), Some("60"));

    // other modules do not see the row
    assert_eq!(config_item::find_value(&db, "other", "timeout").await?, None);

    drop(db);
    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[tokio::test]
async fn duplicate_module_and_name_is_rejected() -> Result<()> {
    let (db, path) = super::sqlite_db().await?;

    config_item::insert(&db, "svc", "host", "a").await?;
    let dup = config_item::insert(&db, "svc", "host", "b").await;
    assert!(matches!(dup, Err(ModelError::Db(_))));

    // same name in another module is fine
    config_item::insert(&db, "web", "host", "c").await?;

    drop(db);
    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[tokio::test]
async fn list_is_scoped_and_ordered_by_name() -> Result<()> {
    let (db, path) = super::sqlite_db().await?;

    config_item::insert(&db, "svc", "zeta", "1").await?;
    config_item::insert(&db, "svc", "alpha", "2").await?;
    config_item::insert(&db, "web", "beta", "3").await?;

    let rows = config_item::list_by_module(&db, "svc").await?;
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);

    assert_eq!(config_item::delete(&db, "svc", "alpha").await?, 1);
    assert_eq!(config_item::delete(&db, "svc", "alpha").await?, 0);
    assert_eq!(config_item::list_by_module(&db, "svc").await?.len(), 1);

    drop(db);
    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[test]
fn column_limits_are_enforced() {
    assert!(config_item::validate("m", "k", "v").is_ok());
    assert!(config_item::validate("m", "", "v").is_err());
    assert!(config_item::validate("m", &"k".repeat(MAX_NAME_LEN + 1), "v").is_err());
    assert!(config_item::validate(&"m".repeat(MAX_MODULE_LEN + 1), "k", "v").is_err());
    assert!(config_item::validate("m", "k", &"v".repeat(MAX_VALUE_LEN + 1)).is_err());
    // limits count characters, not bytes
    assert!(config_item::validate("m", &"é".repeat(MAX_NAME_LEN), "v").is_ok());
}
