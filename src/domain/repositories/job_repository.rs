// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Job;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 存储的数据无法还原为领域对象
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 作业仓库特质
///
/// 新状态由 `Job` 的转换方法计算，并以计算时的状态为条件写入，
/// 终止状态的作业不会再被修改。
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新作业
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 查找审计最近一次创建的作业
    async fn find_latest_by_audit(&self, audit_id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 原子领取作业：仅当状态为 Queued 时转为 Processing
    ///
    /// 领取成功返回更新后的作业，否则返回 None
    async fn claim(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 领取最早入队的作业
    async fn acquire_next(&self) -> Result<Option<Job>, RepositoryError>;
    /// 推进进度游标到已处理数量 `handled`，进度只增不减
    async fn update_progress(&self, id: Uuid, handled: i32) -> Result<bool, RepositoryError>;
    /// 标记作业已完成，进度置为 100
    async fn mark_completed(&self, id: Uuid) -> Result<bool, RepositoryError>;
    /// 标记作业已失败
    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError>;
    /// 查找在指定时间之前开始且仍在处理中的作业
    async fn find_stalled(
        &self,
        started_before: DateTime<FixedOffset>,
    ) -> Result<Vec<Job>, RepositoryError>;
}
