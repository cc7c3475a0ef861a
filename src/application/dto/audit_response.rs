// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::audit::{Audit, AuditStatus, Specialty};
use crate::domain::models::job::{Job, JobStatus};
use crate::domain::models::prompt_result::{PromptCategory, PromptResult, Sentiment};
use crate::domain::models::scores::{AggregateScores, DimensionScores};

/// 审计提交响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAuditResponseDto {
    pub audit_id: Uuid,
    pub job_id: Uuid,
    pub status: JobStatus,
    /// 预计耗时（秒）
    pub estimated_time: u64,
    pub website_url: String,
    pub specialty: Option<Specialty>,
}

/// 审计状态视图
///
/// 处理中或失败时只返回基本信息，完成后返回完整得分与逐条明细
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuditStatusView {
    Summary(AuditSummaryDto),
    Completed { audit: CompletedAuditDto },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummaryDto {
    pub audit_id: Uuid,
    pub website_url: String,
    pub status: AuditStatus,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAuditDto {
    pub id: Uuid,
    pub status: AuditStatus,
    pub website_url: String,
    pub specialty: Option<Specialty>,
    pub overall_score: i32,
    pub citation_count: i32,
    pub dimension_scores: DimensionScores,
    pub prompt_results: PromptResultsDto,
    pub created_at: DateTime<FixedOffset>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResultsDto {
    pub total_prompts: usize,
    pub mentioned_in: usize,
    pub prompts: Vec<PromptBreakdownDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptBreakdownDto {
    pub prompt: String,
    pub category: PromptCategory,
    pub response: String,
    pub analysis: AnalysisDto,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDto {
    pub mentioned: bool,
    pub position: Option<u32>,
    pub sentiment: Sentiment,
    pub competitors: Vec<String>,
}

impl AuditStatusView {
    /// 根据审计状态构建视图
    ///
    /// `results` 仅在审计完成时使用
    pub fn from_audit(audit: Audit, results: Vec<PromptResult>) -> Self {
        match (audit.status, audit.scores) {
            (AuditStatus::Completed, Some(scores)) => Self::Completed {
                audit: CompletedAuditDto::new(audit, scores, results),
            },
            _ => Self::Summary(AuditSummaryDto {
                audit_id: audit.id,
                website_url: audit.website_url,
                status: audit.status,
                timestamp: audit.completed_at.unwrap_or(audit.created_at),
            }),
        }
    }
}

impl CompletedAuditDto {
    fn new(audit: Audit, scores: AggregateScores, results: Vec<PromptResult>) -> Self {
        let mentioned_in = results.iter().filter(|r| r.extraction.mentioned).count();
        let prompts: Vec<PromptBreakdownDto> = results
            .into_iter()
            .map(|result| PromptBreakdownDto {
                prompt: result.prompt,
                category: result.category,
                response: result.response,
                analysis: AnalysisDto {
                    mentioned: result.extraction.mentioned,
                    position: result.extraction.position,
                    sentiment: result.extraction.sentiment,
                    competitors: result.extraction.competitors,
                },
                score: result.score,
            })
            .collect();

        Self {
            id: audit.id,
            status: audit.status,
            website_url: audit.website_url,
            specialty: audit.specialty,
            overall_score: scores.overall,
            citation_count: audit.citation_count.unwrap_or(mentioned_in as i32),
            dimension_scores: scores.dimensions,
            prompt_results: PromptResultsDto {
                total_prompts: prompts.len(),
                mentioned_in,
                prompts,
            },
            created_at: audit.created_at,
            completed_at: audit.completed_at,
        }
    }
}

/// 作业查询视图
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JobStatusView {
    Found(Job),
    NotFound { status: &'static str },
}

impl JobStatusView {
    pub fn not_found() -> Self {
        Self::NotFound {
            status: "not_found",
        }
    }
}

/// 触发响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponseDto {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: i32,
    /// 本次调用是否启动了运行
    pub triggered: bool,
}

impl TriggerResponseDto {
    pub fn from_job(job: &Job, triggered: bool) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            progress: job.progress,
            triggered,
        }
    }
}
