// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Job;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 作业队列特质
///
/// 入队即返回可追踪的作业句柄（作业ID），工作器通过原子领取获取作业
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队作业并唤醒一个空闲工作器
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError>;

    /// 领取最早入队的作业
    async fn dequeue(&self) -> Result<Option<Job>, QueueError>;

    /// 领取指定作业，作业不处于 Queued 时返回 None
    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>, QueueError>;

    /// 等待新作业通知，最多等待 `max_wait`
    async fn wait_for_work(&self, max_wait: Duration);
}

/// 基于数据库的作业队列
///
/// 作业表即队列，进程内通过 `Notify` 唤醒空闲工作器；
/// 错过通知的工作器会在下一次轮询时领取作业。
pub struct DbJobQueue {
    /// 作业仓库
    repository: Arc<dyn JobRepository>,
    notify: Arc<Notify>,
}

impl DbJobQueue {
    /// 创建新的数据库作业队列实例
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self {
            repository,
            notify: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl JobQueue for DbJobQueue {
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError> {
        let created = self.repository.create(&job).await?;
        self.notify.notify_one();
        Ok(created)
    }

    async fn dequeue(&self) -> Result<Option<Job>, QueueError> {
        let job = self.repository.acquire_next().await?;
        Ok(job)
    }

    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>, QueueError> {
        let job = self.repository.claim(job_id).await?;
        Ok(job)
    }

    async fn wait_for_work(&self, max_wait: Duration) {
        let _ = tokio::time::timeout(max_wait, self.notify.notified()).await;
    }
}

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for Arc<T> {
    async fn enqueue(&self, job: Job) -> Result<Job, QueueError> {
        (**self).enqueue(job).await
    }

    async fn dequeue(&self) -> Result<Option<Job>, QueueError> {
        (**self).dequeue().await
    }

    async fn claim(&self, job_id: Uuid) -> Result<Option<Job>, QueueError> {
        (**self).claim(job_id).await
    }

    async fn wait_for_work(&self, max_wait: Duration) {
        (**self).wait_for_work(max_wait).await
    }
}
