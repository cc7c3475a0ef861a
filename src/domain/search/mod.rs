// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索领域模块
///
/// 定义 LLM 搜索提供方的契约：请求、回答与错误类型。
/// 具体的 HTTP 适配器位于基础设施层。
pub mod provider;
