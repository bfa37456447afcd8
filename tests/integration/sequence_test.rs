//! Probe task integration tests
//!
//! These tests load task documents the way the dashboard delivers them and
//! run them end to end through the sequence runner.

use api_probe::auth::basic_auth;
use api_probe::config::ProbeConfig;
use api_probe::executor::RequestError;
use api_probe::{ProbeError, ProbeTask, SequenceRunner, TaskStatus};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

use super::{json_response, ScriptedExecutor};

fn login_flow_config() -> Value {
    json!({
        "initialVariables": [
            {"name": "$baseUrl", "value": "https://api.example.com"},
            {"name": "$user", "value": "alice"}
        ],
        "steps": [
            {
                "step_id": "login",
                "name": "Login",
                "request": {
                    "method": "POST",
                    "url": "$baseUrl/login",
                    "headers": {"Content-Type": "application/json"},
                    "body": "{\"user\": \"$user\", \"password\": \"$password\"}"
                },
                "variables": [
                    {"name": "$token", "source": "body", "expression": "$.token"},
                    {"name": "$userId", "source": "body", "expression": "$.user.id"}
                ],
                "assertions": [
                    {"source": "status", "expression": "", "operator": "equals", "expected": 200},
                    {"source": "body", "expression": "$.token", "operator": "exists", "expected": ""}
                ],
                "fail_fast": true
            },
            {
                "step_id": "profile",
                "name": "Profile",
                "request": {
                    "method": "GET",
                    "url": "$baseUrl/users/$userId",
                    "headers": {"Authorization": "Bearer $token"}
                },
                "urlParameters": [{"key": "region", "value": "$region"}],
                "assertions": [
                    {"source": "body", "expression": "name", "operator": "equals", "expected": "$user"},
                    {"source": "headers", "expression": "content-type", "operator": "contains", "expected": "json"}
                ]
            }
        ]
    })
}

fn login_flow_responses() -> Vec<Result<api_probe::models::ProbeResponse, RequestError>> {
    vec![
        Ok(json_response(200, json!({"token": "t-123", "user": {"id": 7}}))),
        Ok(json_response(200, json!({"name": "alice"}))),
    ]
}

#[tokio::test]
async fn test_login_flow_from_json() {
    let task = ProbeTask::from_value(json!({
        "task_id": 101,
        "target": "https://api.example.com",
        "config": login_flow_config()
    }))
    .unwrap();

    let client = ScriptedExecutor::new(login_flow_responses());
    let runner = SequenceRunner::default()
        .with_system_variables(vec![("$password", json!("s3cret")), ("region", json!("eu"))]);
    let report = runner.run(&task, &client).await.unwrap();

    assert_eq!(report.status, TaskStatus::Success);
    assert_eq!(report.task_id, "101");
    assert_eq!(report.message, "completed all 2 steps");
    assert_eq!(report.total_assertions, 4);
    assert_eq!(report.passed_assertions, 4);
    assert_eq!(report.variables["$token"], json!("t-123"));

    let requests = client.recorded();
    assert_eq!(
        requests[0].data,
        Some(json!("{\"user\": \"alice\", \"password\": \"s3cret\"}"))
    );
    assert_eq!(requests[1].url, "https://api.example.com/users/7");
    assert_eq!(requests[1].header("authorization"), Some("Bearer t-123"));
    assert_eq!(requests[1].params.as_ref().unwrap()["region"], "eu");
}

#[tokio::test]
async fn test_config_delivered_as_string() {
    let task = ProbeTask::from_json(
        &json!({
            "task_id": "t-string",
            "config": login_flow_config().to_string()
        })
        .to_string(),
    )
    .unwrap();

    assert_eq!(task.steps().len(), 2);

    let client = ScriptedExecutor::new(login_flow_responses());
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();
    assert!(report.is_success());
}

#[tokio::test]
async fn test_fail_fast_login_stops_task() {
    let task = ProbeTask::from_value(json!({"task_id": "t", "config": login_flow_config()})).unwrap();

    let client = ScriptedExecutor::new(vec![Ok(json_response(401, json!({"error": "denied"})))]);
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();

    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.message, "step 'Login' failed: expected 200, got 401");
    assert_eq!(report.total_assertions, 2);
    assert_eq!(report.passed_assertions, 0);
    assert_eq!(client.recorded().len(), 1);
}

#[tokio::test]
async fn test_transport_failure_in_second_step() {
    let task = ProbeTask::from_value(json!({"task_id": "t", "config": login_flow_config()})).unwrap();

    let client = ScriptedExecutor::new(vec![
        Ok(json_response(200, json!({"token": "t-123", "user": {"id": 7}}))),
        Err(RequestError::Timeout),
    ]);
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();

    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.message, "step 'Profile' failed: Request timed out");
    assert_eq!(report.total_assertions, 2);
    assert_eq!(report.passed_assertions, 2);
    assert!(report.steps[1].error.is_some());
}

#[tokio::test]
async fn test_task_file_and_step_limit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("task.json");
    fs::write(
        &path,
        json!({"task_id": "file-task", "config": login_flow_config()}).to_string(),
    )
    .unwrap();

    let task = ProbeTask::from_file(&path).unwrap();
    assert_eq!(task.task_id, "file-task");

    let runner = SequenceRunner::new(ProbeConfig {
        max_steps: 1,
        ..Default::default()
    });
    let client = ScriptedExecutor::new(login_flow_responses());
    let err = runner.run(&task, &client).await.unwrap_err();
    assert!(matches!(err, ProbeError::TooManySteps { count: 2, max: 1 }));
    assert!(client.recorded().is_empty());
}

#[test]
fn test_malformed_task_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"config\": {\"steps\": [{\"name\": 1}]}}").unwrap();

    let err = ProbeTask::from_file(&path).unwrap_err();
    assert!(matches!(err, ProbeError::InvalidTask(_)));
}

#[tokio::test]
async fn test_report_wire_shape() {
    let task = ProbeTask::from_value(json!({"task_id": "t", "config": login_flow_config()})).unwrap();
    let client = ScriptedExecutor::new(login_flow_responses());
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["totalAssertions"], 4);
    assert_eq!(value["steps"][0]["stepId"], "login");
    assert!(value["startTime"].is_string());
    assert!(value["endTime"].is_string());
    assert!(value["responseTime"].is_u64());
}

fn two_step_config(authentication: Value) -> Value {
    json!({
        "initialVariables": [{"name": "$user", "value": "alice"}],
        "authentications": [authentication, {"type": "bearer", "token": "ignored"}],
        "steps": [
            {
                "step_id": "first",
                "name": "First",
                "request": {"method": "GET", "url": "https://api.example.com/a"}
            },
            {
                "step_id": "second",
                "name": "Second",
                "request": {
                    "method": "GET",
                    "url": "https://api.example.com/b",
                    "headers": {"Authorization": "Token step-owned"}
                }
            }
        ]
    })
}

#[tokio::test]
async fn test_basic_auth_applied_to_every_step() {
    let config = two_step_config(json!({"type": "basic", "username": "$user", "password": "pw"}));
    let task = ProbeTask::from_value(json!({"task_id": "auth", "config": config})).unwrap();

    let client = ScriptedExecutor::new(vec![
        Ok(json_response(200, json!({}))),
        Ok(json_response(200, json!({}))),
    ]);
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();
    assert!(report.is_success());

    let requests = client.recorded();
    assert_eq!(
        requests[0].header("authorization"),
        Some(basic_auth("alice", "pw").as_str())
    );
    assert_eq!(requests[1].header("authorization"), Some("Token step-owned"));
}

#[tokio::test]
async fn test_bearer_auth_is_masked_in_report() {
    let config = two_step_config(json!({"type": "bearer", "token": "$user-token"}));
    let task = ProbeTask::from_value(json!({"task_id": "auth", "config": config})).unwrap();

    let client = ScriptedExecutor::new(vec![
        Ok(json_response(200, json!({}))),
        Ok(json_response(200, json!({}))),
    ]);
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();

    let requests = client.recorded();
    assert_eq!(requests[0].header("authorization"), Some("Bearer alice-token"));

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["steps"][0]["request"]["headers"]["Authorization"], "******");
    assert_eq!(value["steps"][1]["request"]["headers"]["Authorization"], "******");
    assert!(!value.to_string().contains("alice-token"));
}

#[tokio::test]
async fn test_unsupported_method_fails_only_its_step() {
    let task = ProbeTask::from_value(json!({
        "task_id": "mixed",
        "config": {
            "steps": [
                {"step_id": "trace", "name": "Trace", "request": {"method": "TRACE", "url": "https://x/t"}},
                {"step_id": "nourl", "name": "No URL", "request": {"method": "GET"}},
                {"step_id": "ok", "name": "Ok", "request": {"method": "GET", "url": "https://x/ok"}}
            ]
        }
    }))
    .unwrap();

    let client = ScriptedExecutor::new(vec![Ok(json_response(200, json!({})))]);
    let report = SequenceRunner::default().run(&task, &client).await.unwrap();

    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.steps.len(), 3);
    assert_eq!(
        report.steps[0].error.as_deref(),
        Some("unsupported HTTP method: TRACE")
    );
    assert_eq!(report.message, "step 'No URL' failed: request has no URL");
    assert!(report.steps[2].success);
    assert_eq!(client.recorded().len(), 1);
}
