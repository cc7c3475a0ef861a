// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_context, text_response, ContextOptions, ScriptedAnalyzer, ScriptedProvider,
    TestContext,
};
use aivis::application::dto::audit_request::SubmitAuditRequestDto;
use aivis::domain::models::audit::{AuditStatus, Specialty};
use aivis::domain::models::job::{Job, JobStatus};
use aivis::domain::models::prompt_result::{CitationType, Extraction, Sentiment};
use aivis::domain::repositories::audit_repository::AuditRepository;
use aivis::domain::repositories::job_repository::{JobRepository, RepositoryError};
use aivis::domain::repositories::prompt_result_repository::PromptResultRepository;
use aivis::domain::search::provider::{ProviderError, ProviderOptions};
use aivis::domain::services::aggregate_scorer::{AggregateScorer, AggregationStrategy};
use aivis::domain::services::dimension_scorer::{DimensionScorer, FrequencyFormula};
use aivis::domain::services::prompt_catalog;
use aivis::domain::services::response_analyzer::KeywordAnalyzer;
use aivis::queue::job_queue::JobQueue;
use aivis::queue::scheduler::JobScheduler;
use aivis::workers::audit_worker::AuditWorker;
use aivis::workers::visibility_runner::{RunOutcome, RunnerConfig, VisibilityRunner};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 10 条结果中 4 条提及：名次 [1,2,无,5]，情感 [正,中,正,负]
fn scenario_extractions() -> Vec<Extraction> {
    [
        (Some(1), Sentiment::Positive, 2),
        (Some(2), Sentiment::Neutral, 1),
        (None, Sentiment::Positive, 1),
        (Some(5), Sentiment::Negative, 1),
    ]
    .into_iter()
    .map(|(position, sentiment, mention_count)| Extraction {
        mentioned: true,
        position,
        sentiment,
        mention_count,
        citation_type: CitationType::ByName,
        context: "ExampleWinery".to_string(),
        ..Extraction::default()
    })
    .collect()
}

async fn submit_and_claim(context: &TestContext, specialty: Option<&str>) -> Job {
    let submitted = context
        .use_case
        .submit(SubmitAuditRequestDto {
            url: Some("https://examplewinery.com".to_string()),
            specialty: specialty.map(str::to_string),
        })
        .await
        .unwrap();
    context
        .queue
        .claim(submitted.job_id)
        .await
        .unwrap()
        .expect("job should be claimable")
}

#[tokio::test]
async fn test_rate_based_run_produces_scenario_scores() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        analyzer: Arc::new(ScriptedAnalyzer::new(scenario_extractions())),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    provider.watch(context.jobs.clone(), job.id);

    let outcome = context.runner.execute(job.clone()).await;
    let RunOutcome::Completed(scores) = outcome else {
        panic!("run should complete");
    };
    assert_eq!(scores.dimensions.citation_presence, 10);
    assert_eq!(scores.dimensions.position, 22);
    assert_eq!(scores.dimensions.sentiment, 7);
    assert_eq!(scores.dimensions.frequency, 6);
    assert_eq!(scores.overall, 45);

    let audit = context.audits.find_by_id(job.audit_id).await.unwrap().unwrap();
    assert_eq!(audit.status, AuditStatus::Completed);
    assert_eq!(audit.scores, Some(scores));
    assert_eq!(audit.citation_count, Some(4));
    assert!(audit.completed_at.is_some());

    let finished = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.current_prompt, 10);
    assert_eq!(finished.progress, 100);

    // 每次调用前观察到的进度单调不减，且在完成前不超过 99
    let observed = provider.observed_progress();
    assert_eq!(observed.len(), 10);
    assert!(observed.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(observed.iter().all(|progress| *progress <= 99));
    assert_eq!(observed[0], 0);
}

#[tokio::test]
async fn test_per_prompt_average_run_produces_scenario_scores() {
    let context = create_context(ContextOptions {
        analyzer: Arc::new(ScriptedAnalyzer::new(scenario_extractions())),
        aggregation: AggregationStrategy::PerPromptAverage,
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    let RunOutcome::Completed(scores) = context.runner.execute(job).await else {
        panic!("run should complete");
    };

    assert_eq!(scores.dimensions.citation_presence, 10);
    assert_eq!(scores.dimensions.position, 8);
    assert_eq!(scores.dimensions.sentiment, 7);
    assert_eq!(scores.dimensions.frequency, 4);
    assert_eq!(scores.overall, 29);
}

#[tokio::test]
async fn test_results_follow_catalog_order() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, Some("red_wine")).await;
    context.runner.execute(job.clone()).await;

    let expected: Vec<String> = prompt_catalog::prompts_for_specialty(Some(Specialty::RedWine))
        .iter()
        .map(|prompt| prompt.text.to_string())
        .collect();
    assert_eq!(provider.calls(), expected);

    let results = context.results.find_by_job(job.id).await.unwrap();
    assert_eq!(results.len(), 10);
    for (index, result) in results.iter().enumerate() {
        assert_eq!(result.prompt_index, index as i32);
        assert_eq!(result.prompt, expected[index]);
        assert_eq!(result.audit_id, job.audit_id);
        assert_eq!(result.score, result.dimension_scores.total());
    }
}

#[tokio::test]
async fn test_failed_prompt_is_skipped_and_excluded() {
    let mut script = vec![text_response("ExampleWinery is the best winery around.")];
    script.push(Err(ProviderError::Http {
        status: 500,
        body: "upstream error".to_string(),
    }));
    let provider = Arc::new(ScriptedProvider::new(script));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    let outcome = context.runner.execute(job.clone()).await;
    let RunOutcome::Completed(scores) = outcome else {
        panic!("run should complete despite a failed prompt");
    };

    let results = context.results.find_by_job(job.id).await.unwrap();
    assert_eq!(results.len(), 9);
    assert!(results.iter().all(|result| result.prompt_index != 1));

    // 1 of 9 persisted results mentions the business
    assert_eq!(scores.dimensions.citation_presence, 3);

    let finished = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.current_prompt, 10);
    assert_eq!(finished.progress, 100);
}

#[tokio::test]
async fn test_missing_credentials_fail_audit_and_job() {
    let provider = Arc::new(ScriptedProvider::unconfigured());
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    let outcome = context.runner.execute(job.clone()).await;
    assert!(matches!(outcome, RunOutcome::Failed));
    assert!(provider.calls().is_empty());

    let audit = context.audits.find_by_id(job.audit_id).await.unwrap().unwrap();
    assert_eq!(audit.status, AuditStatus::Failed);
    assert!(audit.scores.is_none());

    let failed = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.error_message.is_some());
}

#[tokio::test]
async fn test_rejected_credentials_stop_the_run() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        text_response("No particular recommendation."),
        Err(ProviderError::Http {
            status: 401,
            body: "invalid api key".to_string(),
        }),
    ]));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    let outcome = context.runner.execute(job.clone()).await;
    assert!(matches!(outcome, RunOutcome::Failed));
    assert_eq!(provider.calls().len(), 2);

    let audit = context.audits.find_by_id(job.audit_id).await.unwrap().unwrap();
    assert_eq!(audit.status, AuditStatus::Failed);
    assert!(audit.scores.is_none());

    let failed = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.current_prompt, 1);
}

#[tokio::test]
async fn test_run_abandons_job_failed_elsewhere() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()).failing_job_on_call(3));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;

    let job = submit_and_claim(&context, None).await;
    provider.watch(context.jobs.clone(), job.id);

    let outcome = context.runner.execute(job.clone()).await;
    assert!(matches!(outcome, RunOutcome::Abandoned));
    assert_eq!(provider.calls().len(), 3);

    let failed = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.current_prompt, 2);

    let audit = context.audits.find_by_id(job.audit_id).await.unwrap().unwrap();
    assert!(audit.scores.is_none());
}

#[tokio::test]
async fn test_claim_is_exclusive() {
    let context = create_context(ContextOptions::default()).await;

    let job = submit_and_claim(&context, None).await;
    assert_eq!(job.status, JobStatus::Processing);
    assert!(job.started_at.is_some());

    assert!(context.queue.claim(job.id).await.unwrap().is_none());
    assert!(context.queue.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn test_retrigger_does_not_duplicate_results() {
    let context = create_context(ContextOptions::default()).await;

    let job = submit_and_claim(&context, None).await;
    context.runner.execute(job.clone()).await;

    let response = context.use_case.trigger(job.id).await.unwrap();
    assert!(!response.triggered);
    assert_eq!(response.status, JobStatus::Completed);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let results = context.results.find_by_audit(job.audit_id).await.unwrap();
    assert_eq!(results.len(), 10);
}

#[tokio::test]
async fn test_trigger_twice_while_processing_runs_once() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        prompt_delay: Duration::from_millis(20),
        ..ContextOptions::default()
    })
    .await;

    let submitted = context
        .use_case
        .submit(SubmitAuditRequestDto {
            url: Some("https://examplewinery.com".to_string()),
            specialty: None,
        })
        .await
        .unwrap();

    let first = context.use_case.trigger(submitted.job_id).await.unwrap();
    let second = context.use_case.trigger(submitted.job_id).await.unwrap();

    assert!(first.triggered);
    assert_eq!(first.status, JobStatus::Processing);
    assert!(!second.triggered);
    assert_eq!(second.status, JobStatus::Processing);

    let mut job = context
        .jobs
        .find_by_id(submitted.job_id)
        .await
        .unwrap()
        .unwrap();
    for _ in 0..250 {
        if job.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        job = context
            .jobs
            .find_by_id(submitted.job_id)
            .await
            .unwrap()
            .unwrap();
    }

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(provider.calls().len(), 10);

    let results = context
        .results
        .find_by_audit(submitted.audit_id)
        .await
        .unwrap();
    assert_eq!(results.len(), 10);
}

/// 在作业完成之前先把它标记为失败，等同于超时清理抢先一步
struct ReapedBeforeCompletion {
    inner: Arc<dyn JobRepository>,
}

#[async_trait]
impl JobRepository for ReapedBeforeCompletion {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        self.inner.create(job).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_latest_by_audit(&self, audit_id: Uuid) -> Result<Option<Job>, RepositoryError> {
        self.inner.find_latest_by_audit(audit_id).await
    }

    async fn claim(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        self.inner.claim(id).await
    }

    async fn acquire_next(&self) -> Result<Option<Job>, RepositoryError> {
        self.inner.acquire_next().await
    }

    async fn update_progress(&self, id: Uuid, handled: i32) -> Result<bool, RepositoryError> {
        self.inner.update_progress(id, handled).await
    }

    async fn mark_completed(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.mark_failed(id, "Job timed out").await?;
        self.inner.mark_completed(id).await
    }

    async fn mark_failed(&self, id: Uuid, message: &str) -> Result<bool, RepositoryError> {
        self.inner.mark_failed(id, message).await
    }

    async fn find_stalled(
        &self,
        started_before: DateTime<FixedOffset>,
    ) -> Result<Vec<Job>, RepositoryError> {
        self.inner.find_stalled(started_before).await
    }
}

#[tokio::test]
async fn test_completion_is_abandoned_when_job_was_reaped() {
    let context = create_context(ContextOptions::default()).await;
    let job = submit_and_claim(&context, None).await;

    let runner = VisibilityRunner::new(
        context.audits.clone(),
        Arc::new(ReapedBeforeCompletion {
            inner: context.jobs.clone(),
        }),
        context.results.clone(),
        Arc::new(ScriptedProvider::new(Vec::new())),
        Arc::new(KeywordAnalyzer::new()),
        RunnerConfig {
            prompt_delay: Duration::ZERO,
            options: ProviderOptions::default(),
            scorer: DimensionScorer::new(FrequencyFormula::Tiered),
            aggregator: AggregateScorer::new(AggregationStrategy::RateBased),
        },
    );

    let outcome = runner.execute(job.clone()).await;
    assert!(matches!(outcome, RunOutcome::Abandoned));

    let failed = context.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("Job timed out"));

    // 审计不会在作业失败后写入得分
    let audit = context.audits.find_by_id(job.audit_id).await.unwrap().unwrap();
    assert_ne!(audit.status, AuditStatus::Completed);
    assert!(audit.scores.is_none());
}

#[tokio::test]
async fn test_worker_processes_queued_job() {
    let context = create_context(ContextOptions::default()).await;

    let submitted = context
        .use_case
        .submit(SubmitAuditRequestDto {
            url: Some("https://examplewinery.com".to_string()),
            specialty: None,
        })
        .await
        .unwrap();

    let worker = AuditWorker::new(context.runner.clone(), Duration::from_millis(10));
    assert!(worker.process_next_job(context.queue.as_ref()).await.unwrap());
    assert!(!worker.process_next_job(context.queue.as_ref()).await.unwrap());

    let job = context
        .jobs
        .find_by_id(submitted.job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_reaper_fails_stalled_jobs() {
    let context = create_context(ContextOptions::default()).await;

    let stalled = submit_and_claim(&context, None).await;
    let queued = context
        .use_case
        .submit(SubmitAuditRequestDto {
            url: Some("https://otherwinery.com".to_string()),
            specialty: None,
        })
        .await
        .unwrap();

    let scheduler = JobScheduler::new(context.jobs.clone(), context.audits.clone(), 1, 0);
    let reaped = scheduler.reap_stalled().await.unwrap();
    assert_eq!(reaped, 1);

    let job = context.jobs.find_by_id(stalled.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("timed out"));

    let audit = context
        .audits
        .find_by_id(stalled.audit_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(audit.status, AuditStatus::Failed);

    let untouched = context
        .jobs
        .find_by_id(queued.job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, JobStatus::Queued);

    // 已失败的作业不会被再次回收
    assert_eq!(scheduler.reap_stalled().await.unwrap(), 0);
}
