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
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 允许访问的密钥列表，为空时不做校验
    pub access_keys: Arc<Vec<String>>,
}

impl AuthState {
    pub fn new(access_keys: Vec<String>) -> Self {
        let access_keys: Vec<String> = access_keys
            .into_iter()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        if access_keys.is_empty() {
            warn!("No access keys configured; audit endpoints are unauthenticated");
        }
        Self {
            access_keys: Arc::new(access_keys),
        }
    }

    fn is_open(&self) -> bool {
        self.access_keys.is_empty()
    }
}

/// 认证中间件
///
/// 校验 `Authorization: Bearer <key>` 请求头
///
/// # 返回值
///
/// * `Ok(Response)` - 认证成功的响应
/// * `Err(StatusCode)` - 认证失败的状态码
pub async fn auth_middleware(
    State(state): State<AuthState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    debug!("AuthMiddleware processing path: {}", req.uri().path());
    if state.is_open() {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if state.access_keys.iter().any(|key| key == token) {
        Ok(next.run(req).await)
    } else {
        warn!("Rejected request with unknown access key");
        Err(StatusCode::UNAUTHORIZED)
    }
}
