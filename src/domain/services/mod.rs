// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含可见度审计的核心业务规则，均为无副作用的纯逻辑：
/// - 提示词目录（prompt_catalog）：按专长生成固定的提示词列表
/// - 回答分析（response_analyzer）：提及、排名、情感与引用来源
/// - 维度评分（dimension_scorer）：单条结果的四个维度得分
/// - 汇总评分（aggregate_scorer）：整次审计的综合得分
pub mod aggregate_scorer;
pub mod dimension_scorer;
pub mod prompt_catalog;
pub mod response_analyzer;
