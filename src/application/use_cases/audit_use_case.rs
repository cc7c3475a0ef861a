// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::audit_request::SubmitAuditRequestDto;
use crate::application::dto::audit_response::{
    AuditStatusView, JobStatusView, SubmitAuditResponseDto, TriggerResponseDto,
};
use crate::domain::models::audit::{Audit, AuditStatus, Specialty};
use crate::domain::models::job::{Job, JobStatus};
use crate::domain::repositories::audit_repository::AuditRepository;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::domain::repositories::prompt_result_repository::PromptResultRepository;
use crate::domain::services::prompt_catalog;
use crate::infrastructure::metrics::AUDITS_SUBMITTED;
use crate::queue::job_queue::{JobQueue, QueueError};
use crate::utils::validators::validate_website_url;
use crate::workers::visibility_runner::VisibilityRunner;

/// 单条提示词的预估耗时（秒），不含提示词间隔
const ESTIMATED_SECS_PER_PROMPT: u64 = 6;

/// 审计用例错误类型
#[derive(Error, Debug)]
pub enum AuditUseCaseError {
    /// 请求校验失败
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// 资源不存在
    #[error("Not found")]
    NotFound,
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 队列错误
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

/// 审计用例
///
/// 负责审计的提交、查询与手动触发
pub struct AuditUseCase {
    audits: Arc<dyn AuditRepository>,
    jobs: Arc<dyn JobRepository>,
    results: Arc<dyn PromptResultRepository>,
    queue: Arc<dyn JobQueue>,
    runner: Arc<VisibilityRunner>,
    max_prompts: usize,
    prompt_delay: Duration,
}

impl AuditUseCase {
    /// 创建新的审计用例实例
    pub fn new(
        audits: Arc<dyn AuditRepository>,
        jobs: Arc<dyn JobRepository>,
        results: Arc<dyn PromptResultRepository>,
        queue: Arc<dyn JobQueue>,
        runner: Arc<VisibilityRunner>,
        max_prompts: usize,
        prompt_delay: Duration,
    ) -> Self {
        Self {
            audits,
            jobs,
            results,
            queue,
            runner,
            max_prompts,
            prompt_delay,
        }
    }

    /// 提交审计
    ///
    /// 校验网站地址，创建审计与作业并入队。未知专长按缺省处理。
    pub async fn submit(
        &self,
        dto: SubmitAuditRequestDto,
    ) -> Result<SubmitAuditResponseDto, AuditUseCaseError> {
        let url = dto
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AuditUseCaseError::ValidationError("URL is required".to_string()))?;
        validate_website_url(url)
            .map_err(|e| AuditUseCaseError::ValidationError(e.to_string()))?;
        dto.validate()
            .map_err(|e| AuditUseCaseError::ValidationError(e.to_string()))?;

        let specialty = dto
            .specialty
            .as_deref()
            .and_then(|value| value.parse::<Specialty>().ok());

        let audit = self
            .audits
            .create(&Audit::new(url.to_string(), specialty))
            .await?;

        let total_prompts = prompt_catalog::catalog_size().min(self.max_prompts) as i32;
        let job = match self.queue.enqueue(Job::new(audit.id, total_prompts)).await {
            Ok(job) => job,
            Err(e) => {
                warn!("Failed to enqueue job for audit {}: {}", audit.id, e);
                if let Err(mark_err) = self.audits.mark_failed(audit.id).await {
                    warn!("Failed to mark audit {} as failed: {}", audit.id, mark_err);
                }
                return Err(e.into());
            }
        };

        counter!(AUDITS_SUBMITTED).increment(1);
        info!(
            audit_id = %audit.id,
            job_id = %job.id,
            total_prompts,
            "Audit submitted"
        );

        Ok(SubmitAuditResponseDto {
            audit_id: audit.id,
            job_id: job.id,
            status: job.status,
            estimated_time: self.estimated_time(total_prompts),
            website_url: audit.website_url,
            specialty: audit.specialty,
        })
    }

    /// 查询审计状态
    pub async fn status(&self, audit_id: Uuid) -> Result<AuditStatusView, AuditUseCaseError> {
        let audit = self
            .audits
            .find_by_id(audit_id)
            .await?
            .ok_or(AuditUseCaseError::NotFound)?;

        let results = if audit.status == AuditStatus::Completed {
            self.results.find_by_audit(audit.id).await?
        } else {
            Vec::new()
        };

        Ok(AuditStatusView::from_audit(audit, results))
    }

    /// 查询审计的最新作业
    pub async fn job(&self, audit_id: Uuid) -> Result<JobStatusView, AuditUseCaseError> {
        let view = match self.jobs.find_latest_by_audit(audit_id).await? {
            Some(job) => JobStatusView::Found(job),
            None => JobStatusView::not_found(),
        };
        Ok(view)
    }

    /// 手动触发作业
    ///
    /// 只有处于 Queued 的作业会被领取并在后台运行；
    /// 其他状态直接返回当前作业，不重复执行。
    pub async fn trigger(&self, job_id: Uuid) -> Result<TriggerResponseDto, AuditUseCaseError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(AuditUseCaseError::NotFound)?;

        if job.status == JobStatus::Queued {
            if let Some(claimed) = self.queue.claim(job.id).await? {
                info!(job_id = %claimed.id, "Job triggered manually");
                let response = TriggerResponseDto::from_job(&claimed, true);
                let runner = self.runner.clone();
                tokio::spawn(async move {
                    runner.execute(claimed).await;
                });
                return Ok(response);
            }
        }

        let current = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(AuditUseCaseError::NotFound)?;
        Ok(TriggerResponseDto::from_job(&current, false))
    }

    fn estimated_time(&self, total_prompts: i32) -> u64 {
        let per_prompt_ms = ESTIMATED_SECS_PER_PROMPT * 1000 + self.prompt_delay.as_millis() as u64;
        (total_prompts.max(0) as u64 * per_prompt_ms).div_ceil(1000)
    }
}
