// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：审计、作业、提示词结果与得分
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 搜索（search）：LLM 搜索提供方契约
/// - 服务（services）：提示词目录、回答分析与评分规则
///
/// 领域层是系统的核心，不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
