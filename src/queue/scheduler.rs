// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::audit_repository::AuditRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::infrastructure::metrics::{AUDITS_FAILED, JOBS_REAPED};
use crate::queue::job_queue::QueueError;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{error, info, warn};

/// 作业调度器
///
/// 定期清理卡住的作业：处于 Processing 超过最长运行时间的作业
/// 被标记为失败，其审计也随之失败，避免审计永远停留在处理中。
pub struct JobScheduler {
    /// 作业仓库
    jobs: Arc<dyn JobRepository>,
    /// 审计仓库
    audits: Arc<dyn AuditRepository>,
    /// 检查周期
    tick: TokioDuration,
    /// 作业最长运行时间
    max_run: Duration,
}

impl JobScheduler {
    /// 创建新的作业调度器实例
    ///
    /// # 参数
    ///
    /// * `jobs` - 作业仓库
    /// * `audits` - 审计仓库
    /// * `tick_secs` - 检查周期（秒）
    /// * `max_run_secs` - 作业最长运行时间（秒）
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        audits: Arc<dyn AuditRepository>,
        tick_secs: u64,
        max_run_secs: i64,
    ) -> Self {
        Self {
            jobs,
            audits,
            tick: TokioDuration::from_secs(tick_secs.max(1)),
            max_run: Duration::seconds(max_run_secs),
        }
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = interval(self.tick);

            loop {
                interval.tick().await;

                match self.reap_stalled().await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Failed {} stalled jobs", count);
                        }
                    }
                    Err(e) => {
                        error!("Failed to reap stalled jobs: {}", e);
                    }
                }
            }
        })
    }

    /// 执行一次清理，返回被判定失败的作业数量
    pub async fn reap_stalled(&self) -> Result<usize, QueueError> {
        let threshold = Utc::now() - self.max_run;
        let stalled = self.jobs.find_stalled(threshold.into()).await?;

        let message = format!(
            "Job timed out after {} seconds",
            self.max_run.num_seconds()
        );
        let mut reaped = 0;
        for job in stalled {
            if !self.jobs.mark_failed(job.id, &message).await? {
                continue;
            }
            warn!(job_id = %job.id, audit_id = %job.audit_id, "Stalled job marked as failed");
            if self.audits.mark_failed(job.audit_id).await? {
                metrics::counter!(AUDITS_FAILED).increment(1);
            }
            metrics::counter!(JOBS_REAPED).increment(1);
            reaped += 1;
        }

        Ok(reaped)
    }
}
