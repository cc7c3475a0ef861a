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

use std::sync::Arc;
use std::time::Duration;

use aivis::application::use_cases::audit_use_case::AuditUseCase;
use aivis::config::settings::Settings;
use aivis::domain::repositories::audit_repository::AuditRepository;
use aivis::domain::repositories::job_repository::JobRepository;
use aivis::domain::repositories::prompt_result_repository::PromptResultRepository;
use aivis::domain::services::aggregate_scorer::AggregateScorer;
use aivis::domain::services::dimension_scorer::DimensionScorer;
use aivis::infrastructure::database::connection;
use aivis::infrastructure::metrics;
use aivis::infrastructure::repositories::audit_repo_impl::AuditRepositoryImpl;
use aivis::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use aivis::infrastructure::repositories::prompt_result_repo_impl::PromptResultRepositoryImpl;
use aivis::infrastructure::search::factory;
use aivis::presentation::middleware::auth_middleware::AuthState;
use aivis::presentation::routes;
use aivis::queue::job_queue::{DbJobQueue, JobQueue};
use aivis::queue::scheduler::JobScheduler;
use aivis::utils::telemetry;
use aivis::workers::manager::WorkerManager;
use aivis::workers::visibility_runner::{RunnerConfig, VisibilityRunner};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(settings.server.json_logs);
    info!("Starting aivis...");
    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    if settings.database.run_migrations {
        info!("Running database migrations...");
        connection::run_migrations(db.as_ref()).await?;
        info!("Database migrations applied");
    }

    // 4. Initialize components
    let audits: Arc<dyn AuditRepository> = Arc::new(AuditRepositoryImpl::new(db.clone()));
    let jobs: Arc<dyn JobRepository> = Arc::new(JobRepositoryImpl::new(db.clone()));
    let results: Arc<dyn PromptResultRepository> =
        Arc::new(PromptResultRepositoryImpl::new(db.clone()));
    let queue: Arc<dyn JobQueue> = Arc::new(DbJobQueue::new(jobs.clone()));

    let provider = factory::create_provider(&settings.provider)?;
    let analyzer = factory::create_analyzer(&settings.provider, settings.analyzer_kind())?;

    let prompt_delay = Duration::from_millis(settings.runner.prompt_delay_ms);
    let runner = Arc::new(VisibilityRunner::new(
        audits.clone(),
        jobs.clone(),
        results.clone(),
        provider,
        analyzer,
        RunnerConfig {
            prompt_delay,
            options: factory::provider_options(&settings.provider),
            scorer: DimensionScorer::new(settings.scoring.frequency_formula),
            aggregator: AggregateScorer::new(settings.scoring.aggregation),
        },
    ));

    // 5. Start workers and scheduler
    let mut worker_manager = WorkerManager::new(
        queue.clone(),
        runner.clone(),
        Duration::from_millis(settings.queue.poll_interval_ms),
    );
    worker_manager.start_workers(settings.queue.workers);

    let scheduler = JobScheduler::new(
        jobs.clone(),
        audits.clone(),
        settings.queue.reaper_interval_secs,
        settings.queue.max_run_secs,
    );
    let scheduler_handle = scheduler.start();

    // 6. Start HTTP server
    let use_case = Arc::new(AuditUseCase::new(
        audits,
        jobs,
        results,
        queue,
        runner,
        settings.runner.max_prompts,
        prompt_delay,
    ));
    let app = routes::routes(use_case, AuthState::new(settings.auth.access_keys.clone()));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    worker_manager.shutdown();
    scheduler_handle.abort();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
