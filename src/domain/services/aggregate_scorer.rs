// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::prompt_result::{Extraction, PromptResult};
use crate::domain::models::scores::{AggregateScores, DimensionScores};
use crate::domain::services::dimension_scorer::sentiment_points;

/// 汇总策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// 按提及率计算：引用与频次按比例，排名按平均名次
    #[default]
    RateBased,
    /// 各维度逐条得分取平均
    PerPromptAverage,
}

/// 汇总评分器
///
/// 空输入返回全零，不会出现除零。
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateScorer {
    strategy: AggregationStrategy,
}

impl AggregateScorer {
    pub fn new(strategy: AggregationStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    pub fn aggregate(&self, results: &[PromptResult]) -> AggregateScores {
        let parts: Vec<(&Extraction, &DimensionScores)> = results
            .iter()
            .map(|result| (&result.extraction, &result.dimension_scores))
            .collect();
        self.aggregate_parts(&parts)
    }

    /// 对 (分析结果, 维度得分) 列表进行汇总
    pub fn aggregate_parts(&self, parts: &[(&Extraction, &DimensionScores)]) -> AggregateScores {
        if parts.is_empty() {
            return AggregateScores::default();
        }

        let dimensions = match self.strategy {
            AggregationStrategy::PerPromptAverage => per_prompt_average(parts),
            AggregationStrategy::RateBased => rate_based(parts),
        };
        AggregateScores::from_dimensions(dimensions)
    }
}

fn rounded_average(values: impl Iterator<Item = i32>, count: usize) -> i32 {
    let sum: i32 = values.sum();
    (sum as f64 / count as f64).round() as i32
}

fn per_prompt_average(parts: &[(&Extraction, &DimensionScores)]) -> DimensionScores {
    let n = parts.len();
    DimensionScores {
        citation_presence: rounded_average(parts.iter().map(|(_, d)| d.citation_presence), n),
        position: rounded_average(parts.iter().map(|(_, d)| d.position), n),
        sentiment: rounded_average(parts.iter().map(|(_, d)| d.sentiment), n),
        frequency: rounded_average(parts.iter().map(|(_, d)| d.frequency), n),
    }
}

fn rate_based(parts: &[(&Extraction, &DimensionScores)]) -> DimensionScores {
    let n = parts.len() as f64;
    let mentioned = parts.iter().filter(|(e, _)| e.mentioned).count() as f64;
    let mention_rate = mentioned / n;

    let positions: Vec<f64> = parts
        .iter()
        .filter_map(|(e, _)| e.position.map(f64::from))
        .collect();
    let position = if positions.is_empty() {
        0
    } else {
        let average = positions.iter().sum::<f64>() / positions.len() as f64;
        (35.0 - 5.0 * average).max(0.0).round() as i32
    };

    DimensionScores {
        citation_presence: (DimensionScores::CITATION_MAX as f64 * mention_rate).round() as i32,
        position,
        sentiment: rounded_average(parts.iter().map(|(e, _)| sentiment_points(e.sentiment)), parts.len()),
        frequency: (DimensionScores::FREQUENCY_MAX as f64 * mention_rate).round() as i32,
    }
}
