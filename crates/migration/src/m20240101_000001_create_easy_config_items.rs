//! Create `EASY_CONFIG_ITEMS` and its `(module, name)` unique index.
//!
//! The table may already exist when it was created by an older deployment
//! that never recorded migrations; in that case nothing is touched.
use sea_orm_migration::{prelude::*, schema::*};

pub const TABLE_NAME: &str = "EASY_CONFIG_ITEMS";
const INDEX_NAME: &str = "idx_easy_config_items_i1";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.has_table(TABLE_NAME).await? {
            return Ok(());
        }
        manager
            .create_table(
                Table::create()
                    .table(EasyConfigItems::Table)
                    .if_not_exists()
                    .col(pk_auto(EasyConfigItems::Id))
                    .col(string_len(EasyConfigItems::Name, 255).not_null())
                    .col(string_len(EasyConfigItems::Value, 4096).not_null())
                    .col(string_len(EasyConfigItems::Module, 64).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(INDEX_NAME)
                    .table(EasyConfigItems::Table)
                    .col(EasyConfigItems::Module)
                    .col(EasyConfigItems::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EasyConfigItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EasyConfigItems {
    #[sea_orm(iden = "EASY_CONFIG_ITEMS")]
    Table,
    Id,
    Name,
    Value,
    Module,
}
