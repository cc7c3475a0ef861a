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

use crate::domain::models::audit::{Audit, AuditStatus};
use crate::domain::models::scores::{AggregateScores, DimensionScores};
use crate::domain::repositories::audit_repository::AuditRepository;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::infrastructure::database::entities::audit as audit_entity;
use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 审计仓库实现
///
/// 基于SeaORM实现的审计数据访问层
#[derive(Clone)]
pub struct AuditRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl AuditRepositoryImpl {
    /// 创建新的审计仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<audit_entity::Model> for Audit {
    type Error = RepositoryError;

    fn try_from(model: audit_entity::Model) -> Result<Self, Self::Error> {
        let status: AuditStatus = model
            .status
            .parse()
            .map_err(|_| RepositoryError::Corrupt(format!("audit status '{}'", model.status)))?;

        let scores = match (
            model.overall_score,
            model.citation_presence_score,
            model.position_score,
            model.sentiment_score,
            model.frequency_score,
        ) {
            (Some(overall), Some(citation_presence), Some(position), Some(sentiment), Some(frequency)) => {
                Some(AggregateScores {
                    overall,
                    dimensions: DimensionScores {
                        citation_presence,
                        position,
                        sentiment,
                        frequency,
                    },
                })
            }
            _ => None,
        };

        Ok(Self {
            id: model.id,
            website_url: model.website_url,
            // 未知专长按缺省处理
            specialty: model.specialty.and_then(|s| s.parse().ok()),
            status,
            scores,
            citation_count: model.citation_count,
            created_at: model.created_at,
            completed_at: model.completed_at,
        })
    }
}

impl From<&Audit> for audit_entity::ActiveModel {
    fn from(audit: &Audit) -> Self {
        let dimensions = audit.scores.map(|s| s.dimensions);
        Self {
            id: Set(audit.id),
            website_url: Set(audit.website_url.clone()),
            specialty: Set(audit.specialty.map(|s| s.to_string())),
            status: Set(audit.status.to_string()),
            overall_score: Set(audit.scores.map(|s| s.overall)),
            citation_presence_score: Set(dimensions.map(|d| d.citation_presence)),
            position_score: Set(dimensions.map(|d| d.position)),
            sentiment_score: Set(dimensions.map(|d| d.sentiment)),
            frequency_score: Set(dimensions.map(|d| d.frequency)),
            citation_count: Set(audit.citation_count),
            created_at: Set(audit.created_at),
            completed_at: Set(audit.completed_at),
        }
    }
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn create(&self, audit: &Audit) -> Result<Audit, RepositoryError> {
        let model: audit_entity::ActiveModel = audit.into();

        let inserted = model.insert(self.db.as_ref()).await?;
        inserted.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Audit>, RepositoryError> {
        let model = audit_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Audit::try_from).transpose()
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        scores: &AggregateScores,
        citation_count: i32,
    ) -> Result<bool, RepositoryError> {
        let Some(audit) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let Ok(completed) = audit.complete(*scores, citation_count) else {
            return Ok(false);
        };

        // 分数与引用数在同一条语句中写入
        let model: audit_entity::ActiveModel = (&completed).into();
        let result = audit_entity::Entity::update_many()
            .set(model)
            .filter(audit_entity::Column::Id.eq(id))
            .filter(audit_entity::Column::Status.eq(AuditStatus::Processing.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_failed(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let Some(audit) = self.find_by_id(id).await? else {
            return Ok(false);
        };
        let Ok(failed) = audit.fail() else {
            return Ok(false);
        };

        let result = audit_entity::Entity::update_many()
            .col_expr(
                audit_entity::Column::Status,
                Expr::value(failed.status.to_string()),
            )
            .col_expr(
                audit_entity::Column::CompletedAt,
                Expr::value(failed.completed_at),
            )
            .filter(audit_entity::Column::Id.eq(id))
            .filter(audit_entity::Column::Status.eq(AuditStatus::Processing.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }
}
