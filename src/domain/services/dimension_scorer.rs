// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::prompt_result::{CitationType, Extraction, Sentiment};
use crate::domain::models::scores::DimensionScores;

/// 频次得分公式
///
/// 同一次部署只使用一种公式，一个审计内不会混用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyFormula {
    /// 出现多次 15，出现一次 8，未出现 0
    #[default]
    Tiered,
    /// min(15, 5 × 次数)
    Linear,
}

/// 情感得分：正面 25，中性 15，负面 5，未提及 0
pub fn sentiment_points(sentiment: Sentiment) -> i32 {
    match sentiment {
        Sentiment::Positive => 25,
        Sentiment::Neutral => 15,
        Sentiment::Negative => 5,
        Sentiment::NotMentioned => 0,
    }
}

/// 排名得分
pub fn position_points(position: Option<u32>) -> i32 {
    match position {
        Some(1) => 35,
        Some(2..=3) => 25,
        Some(4..=5) => 15,
        Some(rank) if rank > 5 => 5,
        _ => 0,
    }
}

/// 维度评分器
#[derive(Debug, Clone, Copy, Default)]
pub struct DimensionScorer {
    formula: FrequencyFormula,
}

impl DimensionScorer {
    pub fn new(formula: FrequencyFormula) -> Self {
        Self { formula }
    }

    pub fn formula(&self) -> FrequencyFormula {
        self.formula
    }

    /// 为单条分析结果计算四个维度得分
    pub fn score(&self, extraction: &Extraction) -> DimensionScores {
        let citation_presence = match extraction.citation_type {
            CitationType::ByName => 25,
            CitationType::ByCategory => 10,
            CitationType::None if extraction.mentioned => 25,
            CitationType::None => 0,
        };

        DimensionScores {
            citation_presence,
            position: position_points(extraction.position),
            sentiment: sentiment_points(extraction.sentiment),
            frequency: self.frequency_points(extraction.mention_count),
        }
    }

    fn frequency_points(&self, mention_count: u32) -> i32 {
        match self.formula {
            FrequencyFormula::Tiered => match mention_count {
                0 => 0,
                1 => 8,
                _ => 15,
            },
            FrequencyFormula::Linear => (mention_count.min(3) * 5) as i32,
        }
    }
}
