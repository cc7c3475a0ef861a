// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::application::use_cases::audit_use_case::AuditUseCase;
use crate::presentation::handlers::{audit_handler, job_handler};
use crate::presentation::middleware::auth_middleware::{auth_middleware, AuthState};

/// 创建应用路由
///
/// `/health` 与 `/v1/version` 为公开端点，其余端点经过认证中间件
pub fn routes(use_case: Arc<AuditUseCase>, auth: AuthState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let protected_routes = Router::new()
        .route("/v1/audits", post(audit_handler::create_audit))
        .route("/v1/audits/{id}", get(audit_handler::get_audit))
        .route("/v1/jobs/{id}", get(job_handler::get_job))
        .route("/v1/jobs/{id}/trigger", post(job_handler::trigger_job))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(Extension(use_case))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
