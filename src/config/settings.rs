// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::search::provider::RecencyFilter;
use crate::domain::services::aggregate_scorer::AggregationStrategy;
use crate::domain::services::dimension_scorer::FrequencyFormula;

/// 应用程序配置设置
///
/// 包含服务器、数据库、LLM 提供方、运行器、评分、队列、鉴权与指标配置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// LLM 提供方配置
    pub provider: ProviderSettings,
    /// 运行器配置
    pub runner: RunnerSettings,
    /// 评分配置
    pub scoring: ScoringSettings,
    /// 作业队列配置
    pub queue: QueueSettings,
    /// 鉴权配置
    pub auth: AuthSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 是否输出 JSON 格式日志
    pub json_logs: bool,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时执行迁移
    pub run_migrations: bool,
}

/// 提供方类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Perplexity,
    OpenAi,
}

/// 回答分析器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// 关键词与正则扫描
    Keyword,
    /// 交给大模型判定
    Llm,
}

/// LLM 提供方配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// 提供方类型
    pub kind: ProviderKind,
    /// API 密钥
    pub api_key: Option<String>,
    /// API 基础地址，缺省时使用提供方默认值
    pub base_url: Option<String>,
    /// 模型名称，缺省时使用提供方默认值
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// 搜索时效过滤 (day, week, month, year)
    pub recency_filter: Option<RecencyFilter>,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 瞬时错误最大重试次数
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub retry_backoff_ms: u64,
}

/// 运行器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    /// 两次提示词调用之间的间隔（毫秒）
    pub prompt_delay_ms: u64,
    /// 单次审计最多发送的提示词数量
    pub max_prompts: usize,
}

/// 评分配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub frequency_formula: FrequencyFormula,
    pub aggregation: AggregationStrategy,
    /// 回答分析器，缺省时 OpenAI 使用 llm，Perplexity 使用 keyword
    pub analyzer: Option<AnalyzerKind>,
}


/// 作业队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// 审计工作器数量
    pub workers: usize,
    /// 空闲轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 卡住作业清理周期（秒）
    pub reaper_interval_secs: u64,
    /// 作业最长运行时间（秒），超过即判定为失败
    pub max_run_secs: i64,
}

/// 鉴权配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// 共享访问密钥列表，为空时不做校验
    pub access_keys: Vec<String>,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启动 Prometheus 导出器
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件与 `AIVIS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("AIVIS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.access_keys"),
            )
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置构建器
    ///
    /// 数据库地址没有默认值，必须由配置文件、环境变量或覆盖项提供
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.json_logs", false)?
            // Default DB pool settings
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.run_migrations", true)?
            .set_default("provider.kind", "perplexity")?
            .set_default("provider.max_tokens", 1000)?
            .set_default("provider.temperature", 0.2)?
            .set_default("provider.recency_filter", "month")?
            .set_default("provider.timeout_secs", 60)?
            .set_default("provider.max_retries", 2)?
            .set_default("provider.retry_backoff_ms", 1000)?
            .set_default("runner.prompt_delay_ms", 500)?
            .set_default("runner.max_prompts", 10)?
            .set_default("scoring.frequency_formula", "tiered")?
            .set_default("scoring.aggregation", "rate_based")?
            .set_default("queue.workers", 2)?
            .set_default("queue.poll_interval_ms", 1000)?
            .set_default("queue.reaper_interval_secs", 60)?
            .set_default("queue.max_run_secs", 900)?
            .set_default("auth.access_keys", Vec::<String>::new())?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    /// 实际使用的回答分析器
    pub fn analyzer_kind(&self) -> AnalyzerKind {
        self.scoring.analyzer.unwrap_or(match self.provider.kind {
            ProviderKind::OpenAi => AnalyzerKind::Llm,
            ProviderKind::Perplexity => AnalyzerKind::Keyword,
        })
    }
}
