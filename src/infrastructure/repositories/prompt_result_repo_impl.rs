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

use crate::domain::models::prompt_result::{PromptCategory, PromptResult};
use crate::domain::models::scores::DimensionScores;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::domain::repositories::prompt_result_repository::PromptResultRepository;
use crate::infrastructure::database::entities::ai_response as response_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 提示词结果仓库实现
///
/// 引用列表与分析结果以 JSON 形式存储
#[derive(Clone)]
pub struct PromptResultRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl PromptResultRepositoryImpl {
    /// 创建新的提示词结果仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<response_entity::Model> for PromptResult {
    type Error = RepositoryError;

    fn try_from(model: response_entity::Model) -> Result<Self, Self::Error> {
        let category: PromptCategory = model
            .category
            .parse()
            .map_err(|_| RepositoryError::Corrupt(format!("prompt category '{}'", model.category)))?;
        let citations = serde_json::from_value(model.citations)
            .map_err(|e| RepositoryError::Corrupt(format!("citations: {}", e)))?;
        let extraction = serde_json::from_value(model.analysis)
            .map_err(|e| RepositoryError::Corrupt(format!("analysis: {}", e)))?;

        Ok(Self {
            id: model.id,
            audit_id: model.audit_id,
            job_id: model.job_id,
            prompt_index: model.prompt_index,
            category,
            prompt: model.prompt,
            response: model.response,
            citations,
            extraction,
            dimension_scores: DimensionScores {
                citation_presence: model.citation_presence_score,
                position: model.position_score,
                sentiment: model.sentiment_score,
                frequency: model.frequency_score,
            },
            score: model.score,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<&PromptResult> for response_entity::ActiveModel {
    type Error = RepositoryError;

    fn try_from(result: &PromptResult) -> Result<Self, Self::Error> {
        let citations = serde_json::to_value(&result.citations)
            .map_err(|e| RepositoryError::Corrupt(format!("citations: {}", e)))?;
        let analysis = serde_json::to_value(&result.extraction)
            .map_err(|e| RepositoryError::Corrupt(format!("analysis: {}", e)))?;

        Ok(Self {
            id: Set(result.id),
            audit_id: Set(result.audit_id),
            job_id: Set(result.job_id),
            prompt_index: Set(result.prompt_index),
            category: Set(result.category.to_string()),
            prompt: Set(result.prompt.clone()),
            response: Set(result.response.clone()),
            citations: Set(citations),
            analysis: Set(analysis),
            citation_presence_score: Set(result.dimension_scores.citation_presence),
            position_score: Set(result.dimension_scores.position),
            sentiment_score: Set(result.dimension_scores.sentiment),
            frequency_score: Set(result.dimension_scores.frequency),
            score: Set(result.score),
            created_at: Set(result.created_at),
        })
    }
}

#[async_trait]
impl PromptResultRepository for PromptResultRepositoryImpl {
    async fn save(&self, result: &PromptResult) -> Result<(), RepositoryError> {
        let model = response_entity::ActiveModel::try_from(result)?;

        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<PromptResult>, RepositoryError> {
        let models = response_entity::Entity::find()
            .filter(response_entity::Column::JobId.eq(job_id))
            .order_by_asc(response_entity::Column::PromptIndex)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(PromptResult::try_from).collect()
    }

    async fn find_by_audit(&self, audit_id: Uuid) -> Result<Vec<PromptResult>, RepositoryError> {
        let models = response_entity::Entity::find()
            .filter(response_entity::Column::AuditId.eq(audit_id))
            .order_by_asc(response_entity::Column::CreatedAt)
            .order_by_asc(response_entity::Column::PromptIndex)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(PromptResult::try_from).collect()
    }
}
