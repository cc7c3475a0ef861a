// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::json;

use crate::domain::search::provider::{
    ProviderError, ProviderRequest, ProviderResponse, SearchProvider,
};
use crate::infrastructure::search::chat_client::{message_content, ChatCompletionClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a helpful assistant recommending wineries and \
    hospitality businesses. Name specific businesses in your answer.";

/// OpenAI 聊天补全提供方
///
/// 不返回引用 URL，引用来源由分析器按关键词推断
pub struct OpenAiProvider {
    client: ChatCompletionClient,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: ChatCompletionClient, model: Option<String>) -> Self {
        Self {
            client,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl SearchProvider for OpenAiProvider {
    async fn send(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.options.max_tokens,
            "temperature": request.options.temperature
        });

        let response = self.client.post(&body).await?;
        Ok(ProviderResponse {
            text: message_content(&response)?,
            citation_urls: Vec::new(),
        })
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
