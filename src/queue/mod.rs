// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供作业队列和调度功能
/// 负责作业的入队、领取以及卡住作业的清理
pub mod job_queue;
pub mod scheduler;
