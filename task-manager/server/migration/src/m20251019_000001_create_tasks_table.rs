use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    DueDate,
}

const TITLE_MAX_LEN: u32 = 200;
const ENUM_VALUE_MAX_LEN: u32 = 20;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string_len(Tasks::Title, TITLE_MAX_LEN))
                    .col(text_null(Tasks::Description))
                    .col(string_len(Tasks::Status, ENUM_VALUE_MAX_LEN).default("pending"))
                    .col(string_len(Tasks::Priority, ENUM_VALUE_MAX_LEN).default("medium"))
                    .col(date_null(Tasks::DueDate))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}
