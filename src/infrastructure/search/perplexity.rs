// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::search::provider::{
    ProviderError, ProviderRequest, ProviderResponse, SearchProvider,
};
use crate::infrastructure::search::chat_client::{message_content, ChatCompletionClient};

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "sonar";

const SYSTEM_PROMPT: &str = "You are a knowledgeable local travel and wine country guide. \
    Answer with specific, named recommendations and cite your sources.";

/// Perplexity 搜索提供方
///
/// 回答附带顶层 `citations` 引用 URL 列表
pub struct PerplexityProvider {
    client: ChatCompletionClient,
    model: String,
}

impl PerplexityProvider {
    pub fn new(client: ChatCompletionClient, model: Option<String>) -> Self {
        Self {
            client,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn request_body(&self, request: &ProviderRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.options.max_tokens,
            "temperature": request.options.temperature
        });
        if let Some(filter) = request.options.recency_filter {
            body["search_recency_filter"] = json!(filter.as_str());
        }
        body
    }
}

/// 提取引用 URL：优先 `citations`，其次 `search_results[].url`
fn citation_urls(body: &Value) -> Vec<String> {
    let citations: Vec<String> = body["citations"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if !citations.is_empty() {
        return citations;
    }

    body["search_results"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["url"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    async fn send(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = self.client.post(&self.request_body(request)).await?;
        Ok(ProviderResponse {
            text: message_content(&body)?,
            citation_urls: citation_urls(&body),
        })
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn name(&self) -> &'static str {
        "perplexity"
    }
}
