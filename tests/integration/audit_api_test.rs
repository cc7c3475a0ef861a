// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_context, create_server, text_response, ContextOptions, ScriptedProvider,
    TEST_ACCESS_KEY,
};
use aivis::domain::models::audit::AuditStatus;
use aivis::domain::models::job::JobStatus;
use aivis::domain::repositories::audit_repository::AuditRepository;
use aivis::domain::repositories::job_repository::JobRepository;
use aivis::queue::job_queue::JobQueue;
use axum::http::{header, HeaderValue, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn bearer() -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", TEST_ACCESS_KEY)).unwrap()
}

#[tokio::test]
async fn test_health_and_version_are_public() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, vec![TEST_ACCESS_KEY.to_string()]);

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.text(), "OK");

    let version = server.get("/v1/version").await;
    assert_eq!(version.status_code(), StatusCode::OK);
    assert_eq!(version.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_submit_audit_creates_queued_job() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let response = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com", "specialty": null }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["websiteUrl"], "https://examplewinery.com");
    assert!(body["specialty"].is_null());
    assert!(body["estimatedTime"].as_u64().unwrap() > 0);

    let audit_id: Uuid = serde_json::from_value(body["auditId"].clone()).unwrap();
    let job_id: Uuid = serde_json::from_value(body["jobId"].clone()).unwrap();

    let audit = context.audits.find_by_id(audit_id).await.unwrap().unwrap();
    assert_eq!(audit.status, AuditStatus::Processing);
    assert!(audit.scores.is_none());

    let job = context.jobs.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.audit_id, audit_id);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.total_prompts, 10);
    assert_eq!(job.current_prompt, 0);
    assert_eq!(job.progress, 0);
}

#[tokio::test]
async fn test_submit_audit_caps_prompts_and_ignores_unknown_specialty() {
    let context = create_context(ContextOptions {
        max_prompts: 4,
        ..ContextOptions::default()
    })
    .await;
    let server = create_server(&context, Vec::new());

    let response = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com", "specialty": "cider" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert!(body["specialty"].is_null());

    let job_id: Uuid = serde_json::from_value(body["jobId"].clone()).unwrap();
    let job = context.jobs.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.total_prompts, 4);
}

#[tokio::test]
async fn test_submit_audit_keeps_known_specialty() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let response = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com", "specialty": "sparkling" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["specialty"], "sparkling");
}

#[tokio::test]
async fn test_submit_audit_rejects_invalid_url() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    for payload in [
        json!({ "url": "not-a-url" }),
        json!({ "url": "ftp://examplewinery.com" }),
        json!({ "url": "" }),
        json!({ "specialty": "rose" }),
    ] {
        let response = server.post("/v1/audits").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", payload);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    assert!(context.queue.dequeue().await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_unknown_audit_returns_not_found() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let response = server.get(&format!("/v1/audits/{}", Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_processing_audit_withholds_scores() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let submitted: Value = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com" }))
        .await
        .json();
    let audit_id = submitted["auditId"].as_str().unwrap().to_string();

    let response = server.get(&format!("/v1/audits/{}", audit_id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["auditId"], audit_id.as_str());
    assert_eq!(body["status"], "processing");
    assert!(body["timestamp"].is_string());
    assert!(body.get("audit").is_none());
}

#[tokio::test]
async fn test_get_job_for_unknown_audit_reports_not_found() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let response = server.get(&format!("/v1/jobs/{}", Uuid::new_v4())).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "not_found" }));
}

#[tokio::test]
async fn test_get_job_returns_latest_job() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let submitted: Value = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com" }))
        .await
        .json();
    let audit_id = submitted["auditId"].as_str().unwrap();

    let body: Value = server.get(&format!("/v1/jobs/{}", audit_id)).await.json();
    assert_eq!(body["id"], submitted["jobId"]);
    assert_eq!(body["auditId"], audit_id);
    assert_eq!(body["status"], "queued");
    assert_eq!(body["totalPrompts"], 10);
    assert_eq!(body["progress"], 0);
}

#[tokio::test]
async fn test_trigger_unknown_job_returns_not_found() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, Vec::new());

    let response = server
        .post(&format!("/v1/jobs/{}/trigger", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trigger_runs_audit_to_completion() {
    let provider = Arc::new(ScriptedProvider::new(vec![text_response(
        "Oakville Grove Winery is the best spot, followed by Silver Creek Vineyard and then ExampleWinery Estate.",
    )]));
    let context = create_context(ContextOptions {
        provider: provider.clone(),
        ..ContextOptions::default()
    })
    .await;
    let server = create_server(&context, Vec::new());

    let submitted: Value = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com" }))
        .await
        .json();
    let audit_id = submitted["auditId"].as_str().unwrap().to_string();
    let job_id = submitted["jobId"].as_str().unwrap().to_string();

    let triggered: Value = server
        .post(&format!("/v1/jobs/{}/trigger", job_id))
        .await
        .json();
    assert_eq!(triggered["triggered"], true);
    assert_eq!(triggered["status"], "processing");

    let mut completed = None;
    for _ in 0..100 {
        let body: Value = server.get(&format!("/v1/audits/{}", audit_id)).await.json();
        if body.get("audit").is_some() {
            completed = Some(body);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let body = completed.expect("audit did not complete");

    let audit = &body["audit"];
    assert_eq!(audit["status"], "completed");
    assert_eq!(audit["citationCount"], 1);
    assert_eq!(audit["promptResults"]["totalPrompts"], 10);
    assert_eq!(audit["promptResults"]["mentionedIn"], 1);
    let first = &audit["promptResults"]["prompts"][0];
    assert_eq!(first["analysis"]["mentioned"], true);
    assert_eq!(first["analysis"]["position"], 3);
    assert_eq!(first["analysis"]["sentiment"], "positive");

    let job: Value = server.get(&format!("/v1/jobs/{}", audit_id)).await.json();
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress"], 100);
    assert_eq!(job["currentPrompt"], 10);

    // 已完成的作业再次触发不会重复执行
    let again: Value = server
        .post(&format!("/v1/jobs/{}/trigger", job_id))
        .await
        .json();
    assert_eq!(again["triggered"], false);
    assert_eq!(again["status"], "completed");
    assert_eq!(provider.calls().len(), 10);
}

#[tokio::test]
async fn test_protected_routes_require_access_key() {
    let context = create_context(ContextOptions::default()).await;
    let server = create_server(&context, vec![TEST_ACCESS_KEY.to_string()]);

    let rejected = server
        .post("/v1/audits")
        .json(&json!({ "url": "https://examplewinery.com" }))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::UNAUTHORIZED);

    let wrong_key = server
        .get(&format!("/v1/jobs/{}", Uuid::new_v4()))
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
        .await;
    assert_eq!(wrong_key.status_code(), StatusCode::UNAUTHORIZED);

    let accepted = server
        .post("/v1/audits")
        .add_header(header::AUTHORIZATION, bearer())
        .json(&json!({ "url": "https://examplewinery.com" }))
        .await;
    assert_eq!(accepted.status_code(), StatusCode::CREATED);
}
