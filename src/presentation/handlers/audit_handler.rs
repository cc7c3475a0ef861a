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
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::{
        dto::audit_request::SubmitAuditRequestDto, use_cases::audit_use_case::AuditUseCase,
    },
    presentation::errors::AppError,
};

/// 提交新的审计
pub async fn create_audit(
    Extension(use_case): Extension<Arc<AuditUseCase>>,
    Json(payload): Json<SubmitAuditRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    let submitted = use_case.submit(payload).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// 获取审计状态
pub async fn get_audit(
    Extension(use_case): Extension<Arc<AuditUseCase>>,
    Path(audit_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = use_case.status(audit_id).await?;
    Ok(Json(view))
}
