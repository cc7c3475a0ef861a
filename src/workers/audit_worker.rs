// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::job_queue::{JobQueue, QueueError};
use crate::workers::visibility_runner::VisibilityRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};
use uuid::Uuid;

/// 审计工作器
///
/// 轮询作业队列，领取到作业后交给运行器执行；空闲时等待入队通知或轮询超时
pub struct AuditWorker {
    worker_id: Uuid,
    runner: Arc<VisibilityRunner>,
    poll_interval: Duration,
}

impl AuditWorker {
    pub fn new(runner: Arc<VisibilityRunner>, poll_interval: Duration) -> Self {
        Self {
            worker_id: Uuid::new_v4(),
            runner,
            poll_interval,
        }
    }

    /// 运行工作器主循环
    pub async fn run<Q>(&self, queue: Arc<Q>)
    where
        Q: JobQueue + ?Sized,
    {
        info!("Audit worker {} started", self.worker_id);

        loop {
            match self.process_next_job(queue.as_ref()).await {
                Ok(true) => {}
                Ok(false) => queue.wait_for_work(self.poll_interval).await,
                Err(e) => {
                    error!("Error acquiring job: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// 领取并执行一个作业
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 执行了一个作业
    /// * `Ok(false)` - 队列为空
    pub async fn process_next_job<Q>(&self, queue: &Q) -> Result<bool, QueueError>
    where
        Q: JobQueue + ?Sized,
    {
        match queue.dequeue().await? {
            Some(job) => {
                info!("Worker {} claimed job {}", self.worker_id, job.id);
                self.runner.execute(job).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
