// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 审计（audit）：针对一个网站的一次可见度检查
/// - 作业（job）：审计的一次执行尝试及其进度
/// - 提示词结果（prompt_result）：单次 LLM 交互及其分析
/// - 得分（scores）：维度得分与综合得分
pub mod audit;
pub mod job;
pub mod prompt_result;
pub mod scores;
