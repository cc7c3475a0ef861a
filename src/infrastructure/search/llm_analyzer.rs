// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::models::prompt_result::{CitationType, Extraction, Sentiment};
use crate::domain::search::provider::ProviderError;
use crate::domain::services::response_analyzer::{
    AnalysisService, KeywordAnalyzer, ResponseAnalyzer, MAX_COMPETITORS,
};
use crate::infrastructure::search::chat_client::{message_content, ChatCompletionClient};

const SYSTEM_PROMPT: &str = "You analyse answers written by AI assistants to measure how \
    visible a business is in them. You output only valid JSON.";

/// 分析回答单次发送的最大字符数
const MAX_ANSWER_CHARS: usize = 8000;

/// 大模型返回的判定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    pub mentioned: bool,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

/// 基于大模型的回答分析器
///
/// 把回答交给 `chat/completions` 判定是否提及、排名、情感与竞争对手；
/// 引用来源分布、提及次数与上下文句子仍由关键词扫描得出。
/// 调用或解析失败时退回关键词分析结果。
pub struct LlmAnalyzer {
    client: ChatCompletionClient,
    model: String,
    keywords: KeywordAnalyzer,
}

impl LlmAnalyzer {
    pub fn new(client: ChatCompletionClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            keywords: KeywordAnalyzer::new(),
        }
    }

    fn request_body(&self, response_text: &str, business_name: &str) -> Value {
        let answer: String = response_text.chars().take(MAX_ANSWER_CHARS).collect();
        let prompt = format!(
            "Business name: {business_name}\n\
             Decide whether the answer below mentions this business. Return a JSON object \
             with exactly these keys: \"mentioned\" (boolean), \"position\" (1-based rank of \
             the business among the businesses the answer recommends, or null), \"sentiment\" \
             (\"positive\", \"neutral\" or \"negative\" towards the business, or null when it \
             is not mentioned), \"competitors\" (names of other businesses recommended). \
             Return ONLY the JSON object, no markdown formatting.\n\nAnswer:\n{answer}"
        );

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.0
        })
    }

    async fn verdict(
        &self,
        response_text: &str,
        business_name: &str,
    ) -> Result<Verdict, ProviderError> {
        let body = self
            .client
            .post(&self.request_body(response_text, business_name))
            .await?;
        parse_verdict(&message_content(&body)?)
    }
}

/// 解析判定 JSON，容忍 Markdown 代码块包裹
pub fn parse_verdict(content: &str) -> Result<Verdict, ProviderError> {
    let cleaned = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(cleaned)
        .map_err(|e| ProviderError::InvalidResponse(format!("analysis verdict: {}", e)))
}

fn parse_sentiment(raw: Option<&str>) -> Sentiment {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("positive") => Sentiment::Positive,
        Some("negative") => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// 把判定与关键词扫描的结果合并为最终分析结果
///
/// 未提及时强制 position 为空、sentiment 为 NotMentioned、context 为空。
pub fn merge_verdict(verdict: Verdict, scanned: Extraction, business_name: &str) -> Extraction {
    let name = business_name.trim().to_lowercase();
    let mut competitors: Vec<String> = Vec::new();
    for competitor in verdict.competitors {
        let competitor = competitor.trim().to_string();
        let lowered = competitor.to_lowercase();
        if competitor.is_empty()
            || (!name.is_empty() && lowered.contains(&name))
            || competitors.iter().any(|c| c.to_lowercase() == lowered)
        {
            continue;
        }
        competitors.push(competitor);
        if competitors.len() == MAX_COMPETITORS {
            break;
        }
    }

    if !verdict.mentioned {
        let mut extraction = Extraction::not_mentioned(scanned.citation_sources, competitors);
        if scanned.citation_sources.owned_website > 0 {
            extraction.citation_type = CitationType::ByCategory;
        }
        return extraction;
    }

    Extraction {
        mentioned: true,
        position: verdict.position.filter(|position| *position >= 1),
        sentiment: parse_sentiment(verdict.sentiment.as_deref()),
        competitors,
        citation_sources: scanned.citation_sources,
        mention_count: scanned.mention_count.max(1),
        context: scanned.context,
        citation_type: CitationType::ByName,
    }
}

#[async_trait]
impl AnalysisService for LlmAnalyzer {
    async fn evaluate(
        &self,
        response_text: &str,
        business_name: &str,
        business_url: &str,
        citation_urls: &[String],
    ) -> Extraction {
        let scanned =
            self.keywords
                .analyze(response_text, business_name, business_url, citation_urls);

        match self.verdict(response_text, business_name).await {
            Ok(verdict) => merge_verdict(verdict, scanned, business_name),
            Err(e) => {
                warn!("LLM analysis failed, using keyword scan instead: {}", e);
                scanned
            }
        }
    }
}
