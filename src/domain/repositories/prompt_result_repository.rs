// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::prompt_result::PromptResult;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 提示词结果仓库特质
///
/// 结果写入后不可变，(job_id, prompt_index) 唯一。
#[async_trait]
pub trait PromptResultRepository: Send + Sync {
    /// 保存一条结果
    async fn save(&self, result: &PromptResult) -> Result<(), RepositoryError>;
    /// 按目录顺序返回某个作业的全部结果
    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<PromptResult>, RepositoryError>;
    /// 按目录顺序返回某个审计的全部结果
    async fn find_by_audit(&self, audit_id: Uuid) -> Result<Vec<PromptResult>, RepositoryError>;
}
