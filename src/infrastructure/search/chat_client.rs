// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::search::provider::ProviderError;
use crate::utils::retry_policy::RetryPolicy;

/// `chat/completions` 风格接口的 HTTP 客户端
///
/// 负责鉴权头、超时与瞬时错误重试，请求体与回答解析由具体提供方决定。
#[derive(Clone)]
pub struct ChatCompletionClient {
    http: Client,
    api_base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl ChatCompletionClient {
    /// 创建客户端
    ///
    /// 空字符串密钥视为未配置
    pub fn new(
        api_base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            retry,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// 发送请求并返回 JSON 响应体，瞬时错误按策略重试
    pub async fn post(&self, body: &Value) -> Result<Value, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials)?;

        let mut attempt = 0;
        loop {
            match self.post_once(api_key, body).await {
                Ok(value) => return Ok(value),
                Err(e) if self.retry.should_retry_with_error(attempt, &e) => {
                    attempt += 1;
                    let backoff = self.retry.calculate_backoff(attempt);
                    warn!(
                        "Provider request failed ({}), retry {}/{} in {:?}",
                        e, attempt, self.retry.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, api_key: &str, body: &Value) -> Result<Value, ProviderError> {
        let url = format!("{}/chat/completions", self.api_base_url);
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

/// 读取 `choices[0].message.content`
pub fn message_content(body: &Value) -> Result<String, ProviderError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ProviderError::InvalidResponse("missing choices[0].message.content".into()))
}
