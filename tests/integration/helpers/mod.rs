// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use aivis::application::use_cases::audit_use_case::AuditUseCase;
use aivis::domain::models::prompt_result::Extraction;
use aivis::domain::repositories::audit_repository::AuditRepository;
use aivis::domain::repositories::job_repository::JobRepository;
use aivis::domain::repositories::prompt_result_repository::PromptResultRepository;
use aivis::domain::search::provider::{
    ProviderError, ProviderOptions, ProviderRequest, ProviderResponse, SearchProvider,
};
use aivis::domain::services::aggregate_scorer::{AggregateScorer, AggregationStrategy};
use aivis::domain::services::dimension_scorer::{DimensionScorer, FrequencyFormula};
use aivis::domain::services::response_analyzer::{
    AnalysisService, KeywordAnalyzer, ResponseAnalyzer,
};
use aivis::infrastructure::repositories::audit_repo_impl::AuditRepositoryImpl;
use aivis::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use aivis::infrastructure::repositories::prompt_result_repo_impl::PromptResultRepositoryImpl;
use aivis::presentation::middleware::auth_middleware::AuthState;
use aivis::presentation::routes;
use aivis::queue::job_queue::{DbJobQueue, JobQueue};
use aivis::workers::visibility_runner::{RunnerConfig, VisibilityRunner};
use async_trait::async_trait;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_ACCESS_KEY: &str = "test-access-key";

/// 按脚本返回结果的提供方
///
/// 脚本耗尽后返回一段不提及任何业务的固定文本
pub struct ScriptedProvider {
    configured: bool,
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    calls: Mutex<Vec<String>>,
    watched: Mutex<Option<(Arc<dyn JobRepository>, Uuid)>>,
    observed_progress: Mutex<Vec<i32>>,
    fail_job_on_call: Option<usize>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            configured: true,
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            watched: Mutex::new(None),
            observed_progress: Mutex::new(Vec::new()),
            fail_job_on_call: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    /// 在第 `call` 次调用时（从 1 开始）把被观察的作业标记为失败
    pub fn failing_job_on_call(mut self, call: usize) -> Self {
        self.fail_job_on_call = Some(call);
        self
    }

    /// 每次调用前记录被观察作业的进度
    pub fn watch(&self, jobs: Arc<dyn JobRepository>, job_id: Uuid) {
        *self.watched.lock().unwrap() = Some((jobs, job_id));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn observed_progress(&self) -> Vec<i32> {
        self.observed_progress.lock().unwrap().clone()
    }
}

pub fn text_response(text: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        text: text.to_string(),
        citation_urls: Vec::new(),
    })
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    async fn send(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.prompt.clone());
            calls.len()
        };

        let watched = self.watched.lock().unwrap().clone();
        if let Some((jobs, job_id)) = watched {
            if let Some(job) = jobs.find_by_id(job_id).await.unwrap() {
                self.observed_progress.lock().unwrap().push(job.progress);
            }
            if self.fail_job_on_call == Some(call) {
                jobs.mark_failed(job_id, "Job timed out").await.unwrap();
            }
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| text_response("No particular recommendation."))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 按顺序返回预设分析结果的分析器，耗尽后返回未提及
pub struct ScriptedAnalyzer {
    extractions: Mutex<VecDeque<Extraction>>,
}

impl ScriptedAnalyzer {
    pub fn new(extractions: Vec<Extraction>) -> Self {
        Self {
            extractions: Mutex::new(extractions.into()),
        }
    }
}

impl ResponseAnalyzer for ScriptedAnalyzer {
    fn analyze(
        &self,
        _response_text: &str,
        _business_name: &str,
        _business_url: &str,
        _citation_urls: &[String],
    ) -> Extraction {
        self.extractions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
    }
}

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

#[allow(dead_code)]
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub audits: Arc<dyn AuditRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub results: Arc<dyn PromptResultRepository>,
    pub queue: Arc<dyn JobQueue>,
    pub runner: Arc<VisibilityRunner>,
    pub use_case: Arc<AuditUseCase>,
}

pub struct ContextOptions {
    pub provider: Arc<dyn SearchProvider>,
    pub analyzer: Arc<dyn AnalysisService>,
    pub aggregation: AggregationStrategy,
    pub max_prompts: usize,
    pub prompt_delay: Duration,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            provider: Arc::new(ScriptedProvider::new(Vec::new())),
            analyzer: Arc::new(KeywordAnalyzer::new()),
            aggregation: AggregationStrategy::RateBased,
            max_prompts: 10,
            prompt_delay: Duration::ZERO,
        }
    }
}

pub async fn create_context(options: ContextOptions) -> TestContext {
    let db = setup_db().await;
    let audits: Arc<dyn AuditRepository> = Arc::new(AuditRepositoryImpl::new(db.clone()));
    let jobs: Arc<dyn JobRepository> = Arc::new(JobRepositoryImpl::new(db.clone()));
    let results: Arc<dyn PromptResultRepository> =
        Arc::new(PromptResultRepositoryImpl::new(db.clone()));
    let queue: Arc<dyn JobQueue> = Arc::new(DbJobQueue::new(jobs.clone()));

    let runner = Arc::new(VisibilityRunner::new(
        audits.clone(),
        jobs.clone(),
        results.clone(),
        options.provider,
        options.analyzer,
        RunnerConfig {
            prompt_delay: options.prompt_delay,
            options: ProviderOptions::default(),
            scorer: DimensionScorer::new(FrequencyFormula::Tiered),
            aggregator: AggregateScorer::new(options.aggregation),
        },
    ));

    let use_case = Arc::new(AuditUseCase::new(
        audits.clone(),
        jobs.clone(),
        results.clone(),
        queue.clone(),
        runner.clone(),
        options.max_prompts,
        options.prompt_delay,
    ));

    TestContext {
        db,
        audits,
        jobs,
        results,
        queue,
        runner,
        use_case,
    }
}

pub fn create_server(context: &TestContext, access_keys: Vec<String>) -> TestServer {
    let app = routes::routes(context.use_case.clone(), AuthState::new(access_keys));
    TestServer::new(app).unwrap()
}
