// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 与迁移创建的三张表一一对应
pub mod ai_response;
pub mod audit;
pub mod audit_job;
