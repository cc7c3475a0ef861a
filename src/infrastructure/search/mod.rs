// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// LLM 搜索提供方模块
///
/// 提供 Perplexity 与 OpenAI 两种 `chat/completions` 适配器、
/// 基于大模型的回答分析器，以及根据配置选择它们的工厂
pub mod chat_client;
pub mod factory;
pub mod llm_analyzer;
pub mod openai;
pub mod perplexity;
