use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_VALUE_LEN: usize = 4096;
pub const MAX_MODULE_LEN: usize = 64;

/// One configuration row, unique on `(module, name)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "EASY_CONFIG_ITEMS")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub value: String,
    pub module: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation { fn def(&self) -> RelationDef { panic!("no relations") } }

impl ActiveModelBehavior for ActiveModel {}

/// Check column limits before a write reaches the database.
pub fn validate(module: &str, name: &str, value: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("name longer than {MAX_NAME_LEN} characters")));
    }
    if module.chars().count() > MAX_MODULE_LEN {
        return Err(ModelError::Validation(format!("module longer than {MAX_MODULE_LEN} characters")));
    }
    if value.chars().count() > MAX_VALUE_LEN {
        return Err(ModelError::Validation(format!("value longer than {MAX_VALUE_LEN} characters")));
    }
    Ok(())
}

fn by_key(module: &str, name: &str) -> Select<Entity> {
    Entity::find()
        .filter(Column::Module.eq(module))
        .filter(Column::Name.eq(name))
}

pub async fn find_value<C: ConnectionTrait>(db: &C, module: &str, name: &str) -> Result<Option<String>, ModelError> {
    let value = by_key(module, name)
        .select_only()
        .column(Column::Value)
        .into_tuple::<String>()
        .one(db)
        .await?;
    Ok(value)
}

pub async fn exists<C: ConnectionTrait>(db: &C, module: &str, name: &str) -> Result<bool, ModelError> {
    let n = by_key(module, name).count(db).await?;
    Ok(n > 0)
}

pub async fn insert<C: ConnectionTrait>(db: &C, module: &str, name: &str, value: &str) -> Result<Model, ModelError> {
    validate(module, name, value)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        value: Set(value.to_string()),
        module: Set(module.to_string()),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::from)
}

/// Overwrite the value of an existing row. Returns the affected row count
/// as reported by the driver (MySQL reports 0 when the value is unchanged).
pub async fn update_value<C: ConnectionTrait>(db: &C, module: &str, name: &str, value: &str) -> Result<u64, ModelError> {
    validate(module, name, value)?;
    let res = Entity::update_many()
        .col_expr(Column::Value, Expr::value(value.to_string()))
        .filter(Column::Module.eq(module))
        .filter(Column::Name.eq(name))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn delete<C: ConnectionTrait>(db: &C, module: &str, name: &str) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Module.eq(module))
        .filter(Column::Name.eq(name))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// All rows of a module, ordered by name.
pub async fn list_by_module<C: ConnectionTrait>(db: &C, module: &str) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .filter(Column::Module.eq(module))
        .order_by_asc(Column::Name)
        .all(db)
        .await?;
    Ok(rows)
}
