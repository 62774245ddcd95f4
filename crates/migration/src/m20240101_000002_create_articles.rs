//! Create `articles` table with FK to `users` (author).
//!
//! Includes soft-delete timestamp; slug is unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(uuid(Articles::Id).primary_key())
                    .col(string_len(Articles::Title, 255).not_null())
                    .col(string_len(Articles::Slug, 255).unique_key().not_null())
                    .col(text(Articles::Excerpt).not_null().default(""))
                    .col(text(Articles::Content).not_null())
                    .col(uuid(Articles::AuthorId).not_null())
                    .col(boolean(Articles::Published).not_null().default(false))
                    .col(ColumnDef::new(Articles::PublishedAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Articles::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Articles::UpdatedAt).not_null())
                    .col(ColumnDef::new(Articles::DeletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_articles_author")
                            .from(Articles::Table, Articles::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Articles::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Content,
    AuthorId,
    Published,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Users { Table, Id }
