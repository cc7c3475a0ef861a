use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_audits::Audits;
use crate::m20250101_000002_create_audit_jobs::AuditJobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiResponses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiResponses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiResponses::AuditId).uuid().not_null())
                    .col(ColumnDef::new(AiResponses::JobId).uuid().not_null())
                    .col(ColumnDef::new(AiResponses::PromptIndex).integer().not_null())
                    .col(ColumnDef::new(AiResponses::Category).string_len(32).not_null())
                    .col(ColumnDef::new(AiResponses::Prompt).text().not_null())
                    .col(ColumnDef::new(AiResponses::Response).text().not_null())
                    .col(ColumnDef::new(AiResponses::Citations).json().not_null())
                    .col(ColumnDef::new(AiResponses::Analysis).json().not_null())
                    .col(
                        ColumnDef::new(AiResponses::CitationPresenceScore)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AiResponses::PositionScore).integer().not_null())
                    .col(ColumnDef::new(AiResponses::SentimentScore).integer().not_null())
                    .col(ColumnDef::new(AiResponses::FrequencyScore).integer().not_null())
                    .col(ColumnDef::new(AiResponses::Score).integer().not_null())
                    .col(
                        ColumnDef::new(AiResponses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_responses_audit_id")
                            .from(AiResponses::Table, AiResponses::AuditId)
                            .to(Audits::Table, Audits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_responses_job_id")
                            .from(AiResponses::Table, AiResponses::JobId)
                            .to(AuditJobs::Table, AuditJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per prompt per run; a second runner can never insert a duplicate
        manager
            .create_index(
                Index::create()
                    .name("idx_ai_responses_job_prompt")
                    .table(AiResponses::Table)
                    .col(AiResponses::JobId)
                    .col(AiResponses::PromptIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ai_responses_audit_id")
                    .table(AiResponses::Table)
                    .col(AiResponses::AuditId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiResponses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AiResponses {
    Table,
    Id,
    AuditId,
    JobId,
    PromptIndex,
    Category,
    Prompt,
    Response,
    Citations,
    Analysis,
    CitationPresenceScore,
    PositionScore,
    SentimentScore,
    FrequencyScore,
    Score,
    CreatedAt,
}
