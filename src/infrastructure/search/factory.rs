// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::settings::{AnalyzerKind, ProviderKind, ProviderSettings};
use crate::domain::search::provider::{ProviderOptions, SearchProvider};
use crate::domain::services::response_analyzer::{AnalysisService, KeywordAnalyzer};
use crate::infrastructure::search::chat_client::ChatCompletionClient;
use crate::infrastructure::search::llm_analyzer::LlmAnalyzer;
use crate::infrastructure::search::openai::{self, OpenAiProvider};
use crate::infrastructure::search::perplexity::{self, PerplexityProvider};
use crate::utils::retry_policy::RetryPolicy;

fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Perplexity => perplexity::DEFAULT_BASE_URL,
        ProviderKind::OpenAi => openai::DEFAULT_BASE_URL,
    }
}

fn build_client(settings: &ProviderSettings) -> anyhow::Result<(ChatCompletionClient, String)> {
    let base_url = settings
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url(settings.kind).to_string());

    let retry = RetryPolicy::new(
        settings.max_retries,
        Duration::from_millis(settings.retry_backoff_ms),
    );
    let client = ChatCompletionClient::new(
        base_url.clone(),
        settings.api_key.clone(),
        Duration::from_secs(settings.timeout_secs),
        retry,
    )?;

    Ok((client, base_url))
}

/// 根据配置创建搜索提供方
///
/// 未配置密钥时仍会创建提供方，运行时调用会以缺少凭据失败
pub fn create_provider(settings: &ProviderSettings) -> anyhow::Result<Arc<dyn SearchProvider>> {
    let (client, base_url) = build_client(settings)?;

    let provider: Arc<dyn SearchProvider> = match settings.kind {
        ProviderKind::Perplexity => Arc::new(PerplexityProvider::new(client, settings.model.clone())),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(client, settings.model.clone())),
    };

    if provider.is_configured() {
        info!("Using {} provider at {}", provider.name(), base_url);
    } else {
        warn!(
            "{} provider has no API key configured; audits will fail until one is set",
            provider.name()
        );
    }

    Ok(provider)
}

/// 根据配置创建回答分析器
///
/// `llm` 分析器与提供方共用同一个 API 地址、密钥与模型
pub fn create_analyzer(
    settings: &ProviderSettings,
    kind: AnalyzerKind,
) -> anyhow::Result<Arc<dyn AnalysisService>> {
    match kind {
        AnalyzerKind::Keyword => {
            info!("Analyzing responses with keyword scan");
            Ok(Arc::new(KeywordAnalyzer::new()))
        }
        AnalyzerKind::Llm => {
            let (client, base_url) = build_client(settings)?;
            let model = settings.model.clone().unwrap_or_else(|| {
                match settings.kind {
                    ProviderKind::Perplexity => perplexity::DEFAULT_MODEL,
                    ProviderKind::OpenAi => openai::DEFAULT_MODEL,
                }
                .to_string()
            });
            info!("Analyzing responses with {} at {}", model, base_url);
            Ok(Arc::new(LlmAnalyzer::new(client, model)))
        }
    }
}

/// 每次提示词调用使用的请求选项
pub fn provider_options(settings: &ProviderSettings) -> ProviderOptions {
    ProviderOptions {
        recency_filter: settings.recency_filter,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
