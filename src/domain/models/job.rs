// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 审计作业实体
///
/// 表示一次针对某个审计（Audit）的执行尝试。作业记录了进度游标、
/// 完成百分比以及失败原因，供前端轮询展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 所属审计ID
    pub audit_id: Uuid,
    /// 作业状态
    pub status: JobStatus,
    /// 本次运行要发送的提示词总数
    pub total_prompts: i32,
    /// 已处理的提示词数量（进度游标）
    pub current_prompt: i32,
    /// 完成百分比 (0-100)
    pub progress: i32,
    /// 失败原因
    pub error_message: Option<String>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 作业状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Processing → Completed/Failed
///
/// 终止状态（Completed/Failed）之后不再发生任何转换。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已入队，等待工作器领取
    #[default]
    Queued,
    /// 处理中
    Processing,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl JobStatus {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
///
/// 表示在领域层可能发生的错误情况，目前只有非法的状态转换。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition")]
    InvalidStateTransition,
}

/// 根据已处理数量计算完成百分比
///
/// 结果四舍五入到整数，并在作业真正完成前封顶为 99，
/// 保证 100 只在 Completed 时出现。
pub fn progress_percent(handled: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let handled = handled.clamp(0, total);
    let pct = (100.0 * handled as f64 / total as f64).round() as i32;
    pct.min(99)
}

impl Job {
    /// 创建一个新的作业
    ///
    /// # 参数
    ///
    /// * `audit_id` - 所属审计ID
    /// * `total_prompts` - 提示词总数
    ///
    /// # 返回值
    ///
    /// 返回处于 Queued 状态的新作业
    pub fn new(audit_id: Uuid, total_prompts: i32) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            audit_id,
            status: JobStatus::Queued,
            total_prompts: total_prompts.max(0),
            current_prompt: 0,
            progress: 0,
            error_message: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// 启动作业
    ///
    /// 将作业状态从 Queued 变更为 Processing
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Queued => {
                let now = Utc::now().into();
                self.status = JobStatus::Processing;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 推进进度
    ///
    /// `handled` 为已处理（成功或跳过）的提示词数量。进度只增不减。
    pub fn advance(mut self, handled: i32) -> Result<Self, DomainError> {
        if self.status != JobStatus::Processing {
            return Err(DomainError::InvalidStateTransition);
        }
        let handled = handled.clamp(0, self.total_prompts);
        if handled < self.current_prompt {
            return Ok(self);
        }
        self.current_prompt = handled;
        self.progress = self
            .progress
            .max(progress_percent(handled, self.total_prompts));
        self.updated_at = Utc::now().into();
        Ok(self)
    }

    /// 完成作业
    ///
    /// 将作业状态从 Processing 变更为 Completed，进度置为 100
    pub fn complete(mut self) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Processing => {
                let now = Utc::now().into();
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.completed_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记作业失败
    ///
    /// Queued 或 Processing 状态均可失败；终止状态不可再变更
    pub fn fail(mut self, message: impl Into<String>) -> Result<Self, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidStateTransition);
        }
        let now = Utc::now().into();
        self.status = JobStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(self)
    }
}
