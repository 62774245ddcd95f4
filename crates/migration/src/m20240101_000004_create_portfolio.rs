//! Create `portfolio` table (single-row profile).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Portfolio::Table)
                    .if_not_exists()
                    .col(uuid(Portfolio::Id).primary_key())
                    .col(string_len(Portfolio::Name, 255).not_null())
                    .col(string_len(Portfolio::Title, 255).not_null().default(""))
                    .col(text(Portfolio::Bio).not_null().default(""))
                    .col(string_len(Portfolio::Email, 255).not_null().default(""))
                    .col(ColumnDef::new(Portfolio::SocialLinks).json_binary().null())
                    .col(ColumnDef::new(Portfolio::Settings).json_binary().null())
                    .col(timestamp_with_time_zone(Portfolio::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Portfolio::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Portfolio { Table, Id, Name, Title, Bio, Email, SocialLinks, Settings, UpdatedAt }
