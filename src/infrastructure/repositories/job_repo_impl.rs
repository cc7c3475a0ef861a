// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::job::{Job, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::infrastructure::database::entities::audit_job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 领取冲突时的最大重试次数
const CLAIM_ATTEMPTS: usize = 3;

/// 作业仓库实现
///
/// 作业表本身充当队列：领取通过条件更新 `queued → processing` 完成，
/// 只有受影响行数为 1 的调用者拿到作业，不依赖行锁，SQLite 同样适用。
/// 每次状态变更先用 `Job` 的转换方法计算新状态，再以读取时的状态为条件写入。
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的作业仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<job_entity::Model> for Job {
    type Error = RepositoryError;

    fn try_from(model: job_entity::Model) -> Result<Self, Self::Error> {
        let status: JobStatus = model
            .status
            .parse()
            .map_err(|_| RepositoryError::Corrupt(format!("job status '{}'", model.status)))?;

        Ok(Self {
            id: model.id,
            audit_id: model.audit_id,
            status,
            total_prompts: model.total_prompts,
            current_prompt: model.current_prompt,
            progress: model.progress,
            error_message: model.error_message,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Job> for job_entity::ActiveModel {
    fn from(job: &Job) -> Self {
        Self {
            id: Set(job.id),
            audit_id: Set(job.audit_id),
            status: Set(job.status.to_string()),
            total_prompts: Set(job.total_prompts),
            current_prompt: Set(job.current_prompt),
            progress: Set(job.progress),
            error_message: Set(job.error_message.clone()),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            updated_at: Set(job.updated_at),
        }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let model: job_entity::ActiveModel = job.into();

        let inserted = model.insert(self.db.as_ref()).await?;
        inserted.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Job::try_from).transpose()
    }

    async fn find_latest_by_audit(&self, audit_id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find()
            .filter(job_entity::Column::AuditId.eq(audit_id))
            .order_by_desc(job_entity::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        model.map(Job::try_from).transpose()
    }

    async fn claim(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let Some(job) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let Ok(started) = job.start() else {
            return Ok(None);
        };

        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(started.status.to_string()),
            )
            .col_expr(job_entity::Column::StartedAt, Expr::value(started.started_at))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(started.updated_at))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Queued.to_string()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected != 1 {
            return Ok(None);
        }

        Ok(Some(started))
    }

    async fn acquire_next(&self) -> Result<Option<Job>, RepositoryError> {
        for _ in 0..CLAIM_ATTEMPTS {
            let candidate = job_entity::Entity::find()
                .filter(job_entity::Column::Status.eq(JobStatus::Queued.to_string()))
                .order_by_asc(job_entity::Column::CreatedAt)
                .one(self.db.as_ref())
                .await?;

            let Some(candidate) = candidate else {
                return Ok(None);
            };

            // Another worker may win the race; try the next queued job
            if let Some(job) = self.claim(candidate.id).await? {
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    async fn update_progress(&self, id: Uuid, handled: i32) -> Result<bool, RepositoryError> {
        let Some(job) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let Ok(advanced) = job.advance(handled) else {
            return Ok(false);
        };

        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::CurrentPrompt,
                Expr::value(advanced.current_prompt),
            )
            .col_expr(job_entity::Column::Progress, Expr::value(advanced.progress))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(advanced.updated_at))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Processing.to_string()))
            .filter(job_entity::Column::Progress.lte(advanced.progress))
            .filter(job_entity::Column::CurrentPrompt.lte(advanced.current_prompt))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_completed(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let Some(job) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let Ok(completed) = job.complete() else {
            return Ok(false);
        };

        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(completed.status.to_string()),
            )
            .col_expr(job_entity::Column::Progress, Expr::value(completed.progress))
            .col_expr(
                job_entity::Column::CompletedAt,
                Expr::value(completed.completed_at),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(completed.updated_at))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Processing.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError> {
        let Some(job) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let previous = job.status;
        let Ok(failed) = job.fail(message) else {
            return Ok(false);
        };

        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(failed.status.to_string()),
            )
            .col_expr(
                job_entity::Column::ErrorMessage,
                Expr::value(failed.error_message),
            )
            .col_expr(job_entity::Column::CompletedAt, Expr::value(failed.completed_at))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(failed.updated_at))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(previous.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn find_stalled(
        &self,
        started_before: DateTime<FixedOffset>,
    ) -> Result<Vec<Job>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Processing.to_string()))
            .filter(job_entity::Column::StartedAt.lte(started_before))
            .order_by_asc(job_entity::Column::StartedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(Job::try_from).collect()
    }
}
