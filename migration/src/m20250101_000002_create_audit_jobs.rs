use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_audits::Audits;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditJobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditJobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuditJobs::AuditId).uuid().not_null())
                    .col(ColumnDef::new(AuditJobs::Status).string_len(20).not_null())
                    .col(ColumnDef::new(AuditJobs::TotalPrompts).integer().not_null())
                    .col(
                        ColumnDef::new(AuditJobs::CurrentPrompt)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AuditJobs::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AuditJobs::ErrorMessage).text())
                    .col(
                        ColumnDef::new(AuditJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AuditJobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AuditJobs::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(AuditJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_jobs_audit_id")
                            .from(AuditJobs::Table, AuditJobs::AuditId)
                            .to(Audits::Table, Audits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_jobs_status_created")
                    .table(AuditJobs::Table)
                    .col(AuditJobs::Status)
                    .col(AuditJobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_jobs_audit_id")
                    .table(AuditJobs::Table)
                    .col(AuditJobs::AuditId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum AuditJobs {
    Table,
    Id,
    AuditId,
    Status,
    TotalPrompts,
    CurrentPrompt,
    Progress,
    ErrorMessage,
    CreatedAt,
    StartedAt,
    CompletedAt,
    UpdatedAt,
}
