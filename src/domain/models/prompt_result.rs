// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::scores::DimensionScores;

/// 提示词类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    /// 发现类：推荐、榜单
    Discovery,
    /// 体验类：氛围、场景
    Experience,
    /// 实用类：预订、价格、交通
    Practical,
    /// 专长类：与业务专长相关
    Specialty,
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PromptCategory::Discovery => write!(f, "discovery"),
            PromptCategory::Experience => write!(f, "experience"),
            PromptCategory::Practical => write!(f, "practical"),
            PromptCategory::Specialty => write!(f, "specialty"),
        }
    }
}

impl FromStr for PromptCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(PromptCategory::Discovery),
            "experience" => Ok(PromptCategory::Experience),
            "practical" => Ok(PromptCategory::Practical),
            "specialty" => Ok(PromptCategory::Specialty),
            _ => Err(()),
        }
    }
}

/// 情感倾向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    #[default]
    NotMentioned,
}

/// 引用方式
///
/// 按名称提及得满分，仅按类别提及（例如“当地的家族酒庄”）得部分分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CitationType {
    ByName,
    ByCategory,
    #[default]
    None,
}

/// 引用来源分布
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSources {
    pub reddit: u32,
    pub review_sites: u32,
    pub owned_website: u32,
    pub news: u32,
    pub other: u32,
}

impl CitationSources {
    pub fn total(&self) -> u32 {
        self.reddit + self.review_sites + self.owned_website + self.news + self.other
    }
}

/// 单个回答的分析结果
///
/// 不变式：`mentioned == false` 时，`sentiment` 为 NotMentioned，
/// `position` 为空，`context` 为空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    /// 回答中是否出现业务名称
    pub mentioned: bool,
    /// 在隐含排名中的位置（从 1 开始）
    pub position: Option<u32>,
    /// 情感倾向
    pub sentiment: Sentiment,
    /// 同时出现的其他业务名称（最多 10 个）
    pub competitors: Vec<String>,
    /// 引用来源分布
    pub citation_sources: CitationSources,
    /// 业务名称出现次数
    pub mention_count: u32,
    /// 第一个包含业务名称的句子
    pub context: String,
    /// 引用方式
    pub citation_type: CitationType,
}

impl Extraction {
    /// 未提及时的分析结果
    pub fn not_mentioned(citation_sources: CitationSources, competitors: Vec<String>) -> Self {
        Self {
            mentioned: false,
            position: None,
            sentiment: Sentiment::NotMentioned,
            competitors,
            citation_sources,
            mention_count: 0,
            context: String::new(),
            citation_type: CitationType::None,
        }
    }
}

/// 提示词结果
///
/// 一次 LLM 交互及其派生分析，按审计存储，写入后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub id: Uuid,
    pub audit_id: Uuid,
    pub job_id: Uuid,
    /// 在提示词目录中的顺序
    pub prompt_index: i32,
    pub category: PromptCategory,
    pub prompt: String,
    /// 原始回答文本
    pub response: String,
    /// 提供方返回的引用 URL
    pub citations: Vec<String>,
    pub extraction: Extraction,
    pub dimension_scores: DimensionScores,
    /// 明细得分 (0-100)
    pub score: i32,
    pub created_at: DateTime<FixedOffset>,
}
