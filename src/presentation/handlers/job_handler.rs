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

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{application::use_cases::audit_use_case::AuditUseCase, presentation::errors::AppError};

/// 获取审计的最新作业
///
/// 作业不存在时返回 200 与 `{"status":"not_found"}`
pub async fn get_job(
    Extension(use_case): Extension<Arc<AuditUseCase>>,
    Path(audit_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = use_case.job(audit_id).await?;
    Ok(Json(view))
}

/// 手动触发作业
pub async fn trigger_job(
    Extension(use_case): Extension<Arc<AuditUseCase>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = use_case.trigger(job_id).await?;
    Ok(Json(response))
}
