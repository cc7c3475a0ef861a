// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::setup_db;
use aivis::domain::models::audit::{Audit, AuditStatus};
use aivis::domain::models::job::{Job, JobStatus};
use aivis::domain::models::scores::{AggregateScores, DimensionScores};
use aivis::domain::repositories::audit_repository::AuditRepository;
use aivis::domain::repositories::job_repository::JobRepository;
use aivis::infrastructure::repositories::audit_repo_impl::AuditRepositoryImpl;
use aivis::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use uuid::Uuid;

async fn setup() -> (AuditRepositoryImpl, JobRepositoryImpl, Audit, Job) {
    let db = setup_db().await;
    let audits = AuditRepositoryImpl::new(db.clone());
    let jobs = JobRepositoryImpl::new(db);

    let audit = audits
        .create(&Audit::new("https://examplewinery.com".to_string(), None))
        .await
        .unwrap();
    let job = jobs.create(&Job::new(audit.id, 10)).await.unwrap();
    (audits, jobs, audit, job)
}

fn scenario_scores() -> AggregateScores {
    AggregateScores::from_dimensions(DimensionScores {
        citation_presence: 10,
        position: 22,
        sentiment: 7,
        frequency: 6,
    })
}

#[tokio::test]
async fn test_claim_starts_queued_job_once() {
    let (_, jobs, _, job) = setup().await;

    let claimed = jobs.claim(job.id).await.unwrap().expect("queued job is claimable");
    assert_eq!(claimed.status, JobStatus::Processing);
    assert!(claimed.started_at.is_some());

    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Processing);
    assert!(stored.started_at.is_some());

    assert!(jobs.claim(job.id).await.unwrap().is_none());
    assert!(jobs.claim(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_progress_requires_processing_and_never_regresses() {
    let (_, jobs, _, job) = setup().await;

    // 尚未领取的作业不能推进
    assert!(!jobs.update_progress(job.id, 1).await.unwrap());

    jobs.claim(job.id).await.unwrap();
    assert!(jobs.update_progress(job.id, 4).await.unwrap());
    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.current_prompt, 4);
    assert_eq!(stored.progress, 40);

    jobs.update_progress(job.id, 2).await.unwrap();
    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.current_prompt, 4);
    assert_eq!(stored.progress, 40);

    // 超出总数按总数计，完成前封顶 99
    assert!(jobs.update_progress(job.id, 12).await.unwrap());
    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.current_prompt, 10);
    assert_eq!(stored.progress, 99);
}

#[tokio::test]
async fn test_terminal_job_is_never_rewritten() {
    let (_, jobs, _, job) = setup().await;

    assert!(!jobs.mark_completed(job.id).await.unwrap());

    jobs.claim(job.id).await.unwrap();
    assert!(jobs.mark_completed(job.id).await.unwrap());
    let completed = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.progress, 100);
    assert!(completed.completed_at.is_some());

    assert!(!jobs.mark_failed(job.id, "Job timed out").await.unwrap());
    assert!(!jobs.update_progress(job.id, 10).await.unwrap());
    assert!(!jobs.mark_completed(job.id).await.unwrap());

    let stored = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert!(stored.error_message.is_none());
}

#[tokio::test]
async fn test_queued_job_can_fail_with_message() {
    let (_, jobs, _, job) = setup().await;

    assert!(jobs.mark_failed(job.id, "Failed to queue job").await.unwrap());
    let failed = jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("Failed to queue job"));
    assert!(failed.completed_at.is_some());

    assert!(jobs.claim(job.id).await.unwrap().is_none());
    assert!(!jobs.mark_failed(Uuid::new_v4(), "missing").await.unwrap());
}

#[tokio::test]
async fn test_audit_scores_written_once_on_completion() {
    let (audits, _, audit, _) = setup().await;

    assert!(audits
        .mark_completed(audit.id, &scenario_scores(), 4)
        .await
        .unwrap());
    let completed = audits.find_by_id(audit.id).await.unwrap().unwrap();
    assert_eq!(completed.status, AuditStatus::Completed);
    assert_eq!(completed.scores, Some(scenario_scores()));
    assert_eq!(completed.citation_count, Some(4));
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.website_url, audit.website_url);

    assert!(!audits.mark_failed(audit.id).await.unwrap());
    assert!(!audits
        .mark_completed(audit.id, &AggregateScores::default(), 0)
        .await
        .unwrap());
    let stored = audits.find_by_id(audit.id).await.unwrap().unwrap();
    assert_eq!(stored.scores, Some(scenario_scores()));
}

#[tokio::test]
async fn test_failed_audit_never_gains_scores() {
    let (audits, _, audit, _) = setup().await;

    assert!(audits.mark_failed(audit.id).await.unwrap());
    assert!(!audits
        .mark_completed(audit.id, &scenario_scores(), 4)
        .await
        .unwrap());

    let failed = audits.find_by_id(audit.id).await.unwrap().unwrap();
    assert_eq!(failed.status, AuditStatus::Failed);
    assert!(failed.scores.is_none());
    assert!(failed.citation_count.is_none());

    assert!(!audits.mark_failed(Uuid::new_v4()).await.unwrap());
}
