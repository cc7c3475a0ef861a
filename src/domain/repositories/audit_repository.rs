// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::audit::Audit;
use crate::domain::models::scores::AggregateScores;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 审计仓库特质
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// 创建新审计
    async fn create(&self, audit: &Audit) -> Result<Audit, RepositoryError>;
    /// 根据ID查找审计
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Audit>, RepositoryError>;
    /// 写入最终得分并标记为已完成
    ///
    /// 仅对处于 Processing 的审计生效，返回是否发生了更新
    async fn mark_completed(
        &self,
        id: Uuid,
        scores: &AggregateScores,
        citation_count: i32,
    ) -> Result<bool, RepositoryError>;
    /// 标记审计失败
    async fn mark_failed(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
