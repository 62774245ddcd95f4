use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ARTICLE_INDEXES: &[(&str, Articles)] = &[
    ("idx_articles_author_id", Articles::AuthorId),
    ("idx_articles_published", Articles::Published),
    ("idx_articles_published_at", Articles::PublishedAt),
    ("idx_articles_created_at", Articles::CreatedAt),
    ("idx_articles_deleted_at", Articles::DeletedAt),
];

const PROJECT_INDEXES: &[(&str, Projects)] = &[
    ("idx_projects_featured", Projects::Featured),
    ("idx_projects_created_at", Projects::CreatedAt),
    ("idx_projects_deleted_at", Projects::DeletedAt),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, col) in ARTICLE_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(*name)
                        .table(Articles::Table)
                        .col(*col)
                        .to_owned(),
                )
                .await?;
        }

        for (name, col) in PROJECT_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(*name)
                        .table(Projects::Table)
                        .col(*col)
                        .to_owned(),
                )
                .await?;
        }

        // Project names are listed by title in the admin UI
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_name")
                    .table(Projects::Table)
                    .col(Projects::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in ARTICLE_INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(Articles::Table).to_owned())
                .await?;
        }
        for (name, _) in PROJECT_INDEXES {
            manager
                .drop_index(Index::drop().name(*name).table(Projects::Table).to_owned())
                .await?;
        }
        manager
            .drop_index(Index::drop().name("idx_projects_name").table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Articles { Table, AuthorId, Published, PublishedAt, CreatedAt, DeletedAt }

#[derive(DeriveIden, Clone, Copy)]
enum Projects { Table, Name, Featured, CreatedAt, DeletedAt }
