// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 四个维度得分
///
/// 各维度上限：引用存在 25、排名 35、情感 25、频次 15，合计 100。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub citation_presence: i32,
    pub position: i32,
    pub sentiment: i32,
    pub frequency: i32,
}

impl DimensionScores {
    pub const CITATION_MAX: i32 = 25;
    pub const POSITION_MAX: i32 = 35;
    pub const SENTIMENT_MAX: i32 = 25;
    pub const FREQUENCY_MAX: i32 = 15;

    /// 四个维度之和 (0-100)
    pub fn total(&self) -> i32 {
        self.citation_presence + self.position + self.sentiment + self.frequency
    }
}

/// 审计总分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateScores {
    /// 综合得分 (0-100)，等于四个维度之和
    pub overall: i32,
    /// 维度得分
    pub dimensions: DimensionScores,
}

impl AggregateScores {
    pub fn from_dimensions(dimensions: DimensionScores) -> Self {
        Self {
            overall: dimensions.total(),
            dimensions,
        }
    }
}
