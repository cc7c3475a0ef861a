// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::audit::AuditStatus;
use crate::domain::models::job::Job;
use crate::domain::models::prompt_result::PromptResult;
use crate::domain::models::scores::AggregateScores;
use crate::domain::repositories::audit_repository::AuditRepository;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::domain::repositories::prompt_result_repository::PromptResultRepository;
use crate::domain::search::provider::{
    ProviderError, ProviderOptions, ProviderRequest, SearchProvider,
};
use crate::domain::services::aggregate_scorer::AggregateScorer;
use crate::domain::services::dimension_scorer::DimensionScorer;
use crate::domain::services::prompt_catalog::prompts_for_specialty;
use crate::domain::services::response_analyzer::AnalysisService;
use crate::infrastructure::metrics::{
    AUDITS_COMPLETED, AUDITS_FAILED, AUDIT_DURATION, PROMPTS_TOTAL,
};
use crate::utils::url_utils::business_display_name;

/// 运行器致命错误
///
/// 单个提示词的提供方错误不在此列，它们被记录后跳过
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Provider credentials are not configured")]
    MissingCredentials,
    #[error("Provider rejected the run: {0}")]
    Provider(ProviderError),
    #[error("Audit {0} not found")]
    AuditNotFound(Uuid),
    #[error("Audit is already {0}")]
    AuditClosed(AuditStatus),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 一次运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// 审计完成并写入得分
    Completed(AggregateScores),
    /// 作业在运行途中被他方终止（例如超时清理），本次运行不再写入
    Abandoned,
    /// 审计与作业已标记失败
    Failed,
}

/// 运行器配置
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 两次提示词调用之间的间隔
    pub prompt_delay: Duration,
    /// 提供方请求选项
    pub options: ProviderOptions,
    pub scorer: DimensionScorer,
    pub aggregator: AggregateScorer,
}

/// 可见度测试运行器
///
/// 针对一个已领取的作业，按目录顺序逐条发送提示词，
/// 每条结果立即持久化并推进进度，全部完成后写入汇总得分。
pub struct VisibilityRunner {
    audits: Arc<dyn AuditRepository>,
    jobs: Arc<dyn JobRepository>,
    results: Arc<dyn PromptResultRepository>,
    provider: Arc<dyn SearchProvider>,
    analyzer: Arc<dyn AnalysisService>,
    config: RunnerConfig,
}

impl VisibilityRunner {
    pub fn new(
        audits: Arc<dyn AuditRepository>,
        jobs: Arc<dyn JobRepository>,
        results: Arc<dyn PromptResultRepository>,
        provider: Arc<dyn SearchProvider>,
        analyzer: Arc<dyn AnalysisService>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            audits,
            jobs,
            results,
            provider,
            analyzer,
            config,
        }
    }

    /// 执行一个已领取的作业
    ///
    /// 致命错误会把审计和作业都标记为失败，不会向调用方传播
    #[instrument(skip(self, job), fields(job_id = %job.id, audit_id = %job.audit_id))]
    pub async fn execute(&self, job: Job) -> RunOutcome {
        let started = Instant::now();

        match self.run(&job).await {
            Ok(RunOutcome::Completed(scores)) => {
                info!(overall = scores.overall, "Audit completed");
                metrics::counter!(AUDITS_COMPLETED).increment(1);
                metrics::histogram!(AUDIT_DURATION).record(started.elapsed().as_secs_f64());
                RunOutcome::Completed(scores)
            }
            Ok(outcome) => {
                warn!("Job is no longer processing; run abandoned");
                outcome
            }
            Err(e) => {
                error!("Audit run failed: {}", e);
                self.fail(&job, &e.to_string()).await;
                RunOutcome::Failed
            }
        }
    }

    async fn fail(&self, job: &Job, message: &str) {
        if let Err(e) = self.jobs.mark_failed(job.id, message).await {
            error!("Failed to mark job {} as failed: {}", job.id, e);
        }
        match self.audits.mark_failed(job.audit_id).await {
            Ok(true) => metrics::counter!(AUDITS_FAILED).increment(1),
            Ok(false) => {}
            Err(e) => error!("Failed to mark audit {} as failed: {}", job.audit_id, e),
        }
    }

    async fn run(&self, job: &Job) -> Result<RunOutcome, RunnerError> {
        if !self.provider.is_configured() {
            return Err(RunnerError::MissingCredentials);
        }

        let audit = self
            .audits
            .find_by_id(job.audit_id)
            .await?
            .ok_or(RunnerError::AuditNotFound(job.audit_id))?;
        if audit.status != AuditStatus::Processing {
            return Err(RunnerError::AuditClosed(audit.status));
        }

        let business_name = business_display_name(&audit.website_url);
        let mut prompts = prompts_for_specialty(audit.specialty);
        prompts.truncate(job.total_prompts.max(0) as usize);
        let total = prompts.len() as i32;

        info!(
            business = %business_name,
            prompts = total,
            provider = self.provider.name(),
            "Starting visibility run"
        );

        for (index, prompt) in prompts.iter().enumerate() {
            if index > 0 && !self.config.prompt_delay.is_zero() {
                tokio::time::sleep(self.config.prompt_delay).await;
            }

            let request = ProviderRequest::new(prompt.text, self.config.options.clone());
            match self.provider.send(&request).await {
                Ok(response) => {
                    let extraction = self
                        .analyzer
                        .evaluate(
                            &response.text,
                            &business_name,
                            &audit.website_url,
                            &response.citation_urls,
                        )
                        .await;
                    let dimension_scores = self.config.scorer.score(&extraction);
                    let result = PromptResult {
                        id: Uuid::new_v4(),
                        audit_id: audit.id,
                        job_id: job.id,
                        prompt_index: index as i32,
                        category: prompt.category,
                        prompt: prompt.text.to_string(),
                        response: response.text,
                        citations: response.citation_urls,
                        extraction,
                        dimension_scores,
                        score: dimension_scores.total(),
                        created_at: Utc::now().into(),
                    };
                    self.results.save(&result).await?;
                    metrics::counter!(PROMPTS_TOTAL, "outcome" => "ok").increment(1);
                }
                Err(e) if e.is_fatal() => {
                    metrics::counter!(PROMPTS_TOTAL, "outcome" => "fatal").increment(1);
                    return Err(match e {
                        ProviderError::MissingCredentials => RunnerError::MissingCredentials,
                        other => RunnerError::Provider(other),
                    });
                }
                Err(e) => {
                    warn!(prompt_index = index, "Prompt skipped after provider error: {}", e);
                    metrics::counter!(PROMPTS_TOTAL, "outcome" => "failed").increment(1);
                }
            }

            let handled = index as i32 + 1;
            let advanced = self.jobs.update_progress(job.id, handled).await?;
            if !advanced {
                return Ok(RunOutcome::Abandoned);
            }
        }

        // 失败的提示词不计入分母：只汇总已持久化的结果
        let persisted = self.results.find_by_job(job.id).await?;
        let scores = self.config.aggregator.aggregate(&persisted);
        let citation_count = persisted
            .iter()
            .filter(|result| result.extraction.mentioned)
            .count() as i32;

        // 作业先于审计完成，审计得分只在作业完成后写入
        if !self.jobs.mark_completed(job.id).await? {
            warn!("Job left processing before completion; scores discarded");
            return Ok(RunOutcome::Abandoned);
        }
        if !self
            .audits
            .mark_completed(audit.id, &scores, citation_count)
            .await?
        {
            warn!("Audit is no longer processing; scores discarded");
            return Ok(RunOutcome::Abandoned);
        }

        Ok(RunOutcome::Completed(scores))
    }
}
