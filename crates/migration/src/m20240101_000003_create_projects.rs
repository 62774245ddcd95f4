//! Create `projects` table.
//! Technologies are stored as a JSONB array of strings.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(uuid(Projects::Id).primary_key())
                    .col(string_len(Projects::Name, 255).not_null())
                    .col(text(Projects::Description).not_null().default(""))
                    .col(string_len(Projects::GithubUrl, 500).not_null().default(""))
                    .col(string_len(Projects::LiveUrl, 500).not_null().default(""))
                    .col(json_binary(Projects::Technologies).not_null())
                    .col(boolean(Projects::Featured).not_null().default(false))
                    .col(timestamp_with_time_zone(Projects::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Projects::UpdatedAt).not_null())
                    .col(ColumnDef::new(Projects::DeletedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Projects::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Description,
    GithubUrl,
    LiveUrl,
    Technologies,
    Featured,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
