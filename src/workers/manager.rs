// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::job_queue::JobQueue;
use crate::workers::audit_worker::AuditWorker;
use crate::workers::visibility_runner::VisibilityRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// 工作管理器
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    runner: Arc<VisibilityRunner>,
    poll_interval: Duration,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        runner: Arc<VisibilityRunner>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            runner,
            poll_interval,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = AuditWorker::new(self.runner.clone(), self.poll_interval);
            let queue = self.queue.clone();
            let handle = tokio::spawn(async move {
                worker.run(queue).await;
            });
            self.handles.push(handle);
        }
        info!("Started {} audit workers", count);
    }

    /// 关闭所有工作进程
    ///
    /// 被中断的作业会保持 Processing，由调度器在超时后标记失败
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }
}
