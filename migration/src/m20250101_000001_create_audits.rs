use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Audits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Audits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Audits::WebsiteUrl).string().not_null())
                    .col(ColumnDef::new(Audits::Specialty).string_len(32))
                    .col(ColumnDef::new(Audits::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Audits::OverallScore).integer())
                    .col(ColumnDef::new(Audits::CitationPresenceScore).integer())
                    .col(ColumnDef::new(Audits::PositionScore).integer())
                    .col(ColumnDef::new(Audits::SentimentScore).integer())
                    .col(ColumnDef::new(Audits::FrequencyScore).integer())
                    .col(ColumnDef::new(Audits::CitationCount).integer())
                    .col(
                        ColumnDef::new(Audits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Audits::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audits_status")
                    .table(Audits::Table)
                    .col(Audits::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Audits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Audits {
    Table,
    Id,
    WebsiteUrl,
    Specialty,
    Status,
    OverallScore,
    CitationPresenceScore,
    PositionScore,
    SentimentScore,
    FrequencyScore,
    CitationCount,
    CreatedAt,
    CompletedAt,
}
