//! Native executor integration tests
//!
//! Run the reqwest executor against a local mock server.

use api_probe::config::ProbeConfig;
use api_probe::executor::{ReqwestExecutor, RequestError};
use api_probe::models::{HttpMethod, RequestConfig};
use api_probe::{HttpExecutor, ProbeTask, SequenceRunner};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor() -> ReqwestExecutor {
    ReqwestExecutor::new(ProbeConfig::default()).unwrap()
}

#[tokio::test]
async fn test_json_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("x-client", "probe"))
        .and(body_json(json!({"user": "alice"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "abc"}))
                .insert_header("x-request-id", "req-1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut request = RequestConfig::new(HttpMethod::POST, format!("{}/login", server.uri()));
    request
        .headers
        .insert("X-Client".to_string(), "probe".to_string());
    request.data = Some(json!({"user": "alice"}));

    let response = executor().execute(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, json!({"token": "abc"}));
    assert_eq!(response.header("X-Request-Id").and_then(|h| h.first()), Some("req-1"));
    assert_eq!(response.url.as_deref(), Some(request.url.as_str()));
    assert!(response.duration.is_some());
}

#[tokio::test]
async fn test_string_body_sent_verbatim_and_text_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/raw"))
        .and(body_string("name=alice&id=7"))
        .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
        .mount(&server)
        .await;

    let mut request = RequestConfig::new(HttpMethod::PUT, format!("{}/raw", server.uri()));
    request.data = Some(json!("name=alice&id=7"));

    let response = executor().execute(&request).await.unwrap();
    assert_eq!(response.status, 202);
    assert_eq!(response.data, json!("accepted"));
}

#[tokio::test]
async fn test_params_and_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "2"))
        .and(header(
            "user-agent",
            concat!("api-probe/", env!("CARGO_PKG_VERSION")),
        ))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut defaults = ProbeConfig::default().default_headers;
    defaults.insert("X-Tenant".to_string(), "acme".to_string());
    let config = ProbeConfig {
        default_headers: defaults,
        ..Default::default()
    };

    let mut request = RequestConfig::new(HttpMethod::GET, format!("{}/search", server.uri()));
    request.params = Some(BTreeMap::from([
        ("q".to_string(), "rust".to_string()),
        ("page".to_string(), "2".to_string()),
    ]));

    let response = ReqwestExecutor::new(config)
        .unwrap()
        .execute(&request)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_request_header_overrides_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "custom/2.0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = RequestConfig::new(HttpMethod::GET, server.uri());
    request.headers = HashMap::from([("user-agent".to_string(), "custom/2.0".to_string())]);

    let response = executor().execute(&request).await.unwrap();
    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn test_repeated_headers_are_folded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "theme=dark")
                .append_header("set-cookie", "sid=xyz; HttpOnly"),
        )
        .mount(&server)
        .await;

    let request = RequestConfig::new(HttpMethod::GET, server.uri());
    let response = executor().execute(&request).await.unwrap();

    let cookies: Vec<&str> = response.header("Set-Cookie").unwrap().values().collect();
    assert_eq!(cookies, vec!["theme=dark", "sid=xyz; HttpOnly"]);
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = ProbeConfig {
        timeout: 50,
        ..Default::default()
    };
    let request = RequestConfig::new(HttpMethod::GET, server.uri());
    let err = ReqwestExecutor::new(config)
        .unwrap()
        .execute(&request)
        .await
        .unwrap_err();
    assert_eq!(err, RequestError::Timeout);
}

#[tokio::test]
async fn test_redirects_not_followed_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"moved": true})))
        .mount(&server)
        .await;

    let request = RequestConfig::new(HttpMethod::GET, format!("{}/old", server.uri()));

    let followed = executor().execute(&request).await.unwrap();
    assert_eq!(followed.status, 200);
    assert!(followed.url.unwrap().ends_with("/new"));

    let config = ProbeConfig {
        follow_redirects: false,
        ..Default::default()
    };
    let stopped = ReqwestExecutor::new(config)
        .unwrap()
        .execute(&request)
        .await
        .unwrap();
    assert_eq!(stopped.status, 302);
}

#[tokio::test]
async fn test_unsupported_protocol() {
    let request = RequestConfig::new(HttpMethod::GET, "ftp://example.com/file");
    let err = executor().execute(&request).await.unwrap_err();
    assert!(matches!(err, RequestError::UnsupportedProtocol(_)));
}

#[tokio::test]
async fn test_task_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"session": {"id": "s-1"}}))
                .insert_header("set-cookie", "sid=s-1; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions/s-1"))
        .and(header("authorization", "Session s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": true})))
        .mount(&server)
        .await;

    let task = ProbeTask::from_value(json!({
        "task_id": "mock",
        "config": {
            "initialVariables": [{"name": "$base", "value": server.uri()}],
            "steps": [
                {
                    "step_id": "create",
                    "name": "Create session",
                    "request": {"method": "POST", "url": "$base/sessions", "body": {"ttl": 60}},
                    "variables": [{"name": "sid", "source": "cookie", "expression": "sid"}],
                    "assertions": [{"source": "status", "operator": "equals", "expected": "201"}]
                },
                {
                    "step_id": "check",
                    "name": "Check session",
                    "request": {
                        "method": "GET",
                        "url": "$base/sessions/$sid",
                        "headers": {"Authorization": "Session $sid"}
                    },
                    "assertions": [
                        {"source": "body", "expression": "$.active", "operator": "equals", "expected": "true"},
                        {"source": "time", "operator": "less_than", "expected": 10000}
                    ]
                }
            ]
        }
    }))
    .unwrap();

    let report = SequenceRunner::default().run(&task, &executor()).await.unwrap();
    assert!(report.is_success(), "{}", report.message);
    assert_eq!(report.passed_assertions, 3);
    assert_eq!(report.variables["$sid"], json!("s-1"));
}
