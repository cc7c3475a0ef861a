// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// 提供方错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 未配置 API 密钥，属于致命错误
    #[error("Provider credentials are not configured")]
    MissingCredentials,
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// 是否值得重试（限流、服务端错误、网络超时）
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Network(_) => true,
            _ => false,
        }
    }

    /// 是否应终止整个审计：缺少凭据或凭据被拒绝
    pub fn is_fatal(&self) -> bool {
        match self {
            ProviderError::MissingCredentials => true,
            ProviderError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

/// 搜索时效过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyFilter {
    Day,
    Week,
    Month,
    Year,
}

impl RecencyFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecencyFilter::Day => "day",
            RecencyFilter::Week => "week",
            RecencyFilter::Month => "month",
            RecencyFilter::Year => "year",
        }
    }
}

/// 请求选项
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    pub recency_filter: Option<RecencyFilter>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            recency_filter: Some(RecencyFilter::Month),
            max_tokens: 1000,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub prompt: String,
    pub options: ProviderOptions,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>, options: ProviderOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }
}

/// 提供方回答
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    /// 回答正文
    pub text: String,
    /// 引用 URL 列表，可能为空
    pub citation_urls: Vec<String>,
}

/// LLM 搜索提供方
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 发送一个提示词并返回回答
    async fn send(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// 是否已配置凭据
    fn is_configured(&self) -> bool;

    /// 提供方名称
    fn name(&self) -> &'static str;
}
