// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层基于 SeaORM 提供。
///
/// 包含的仓库接口：
/// - 审计仓库（audit_repository）：审计记录及最终得分
/// - 作业仓库（job_repository）：作业领取、进度与终止状态
/// - 提示词结果仓库（prompt_result_repository）：逐条回答及其分析
pub mod audit_repository;
pub mod job_repository;
pub mod prompt_result_repository;
