// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台作业处理和工作器管理功能
/// 包括可见度测试运行器、轮询工作器与工作器生命周期管理
pub mod audit_worker;
pub mod manager;
pub mod visibility_runner;
