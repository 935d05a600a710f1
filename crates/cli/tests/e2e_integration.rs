//! End-to-end tests for the ABBI chat pipeline.
//!
//! A real router is driven over `oneshot` while the tool gateway and the
//! LLM providers are stood up as mock HTTP servers, so every hop (context
//! assembly, prompt rendering, routing, payload shaping, dispatch and
//! relay) runs as it does in production.

use std::sync::Arc;

use abbi_config::{AppConfig, ProviderConfig};
use abbi_core::ProviderFamily;
use abbi_server::{AppState, build_router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fixtures ─────────────────────────────────────────────────────────────

fn config(gateway: &MockServer, provider: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.gateway.url = gateway.uri();
    for family in ProviderFamily::ALL {
        config.providers.insert(
            family.as_str().to_string(),
            ProviderConfig {
                api_key: Some(format!("{family}-test-key")),
                api_url: Some(provider.uri()),
                default_model: None,
            },
        );
    }
    config
}

fn router(config: AppConfig) -> Router {
    build_router(Arc::new(AppState::from_config(config).unwrap()))
}

fn tool_reply(payload: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "content": [{ "type": "text", "text": payload.to_string() }] }
    }))
}

async fn mount_tool(gateway: &MockServer, tool: &str, payload: Value) {
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(body_partial_json(json!({ "params": { "name": tool } })))
        .respond_with(tool_reply(payload))
        .expect(1)
        .mount(gateway)
        .await;
}

fn chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one upstream call");
    serde_json::from_slice(&requests[0].body).unwrap()
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn gpt_turn_with_empty_context_relays_upstream_verbatim() {
    let gateway = MockServer::start().await;
    mount_tool(&gateway, "hivemind_read", json!({ "success": true, "data": [] })).await;
    mount_tool(&gateway, "sm_query_snowflake", json!({ "success": true, "data": [] })).await;

    let provider = MockServer::start().await;
    let upstream = r#"{"id":"chatcmpl-1","choices":[{"index":0,"message":{"role":"assistant","content":"All quiet."}}]}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer openai-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(upstream, "application/json"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(chat(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "status?" }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_bytes(response).await, upstream.as_bytes());

    let sent = only_request_body(&provider).await;
    assert_eq!(sent["model"], "gpt-4o");
    assert_eq!(sent["max_tokens"], 4096);

    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1], json!({ "role": "user", "content": "status?" }));

    let system = messages[0]["content"].as_str().unwrap();
    assert!(system.starts_with("# SOVEREIGN MIND"));
    assert!(system.contains("## Recent Hive Mind Context\n(no data)"));
    assert!(system.contains("## Active Skills\n(no data)"));
}

#[tokio::test]
async fn claude_turn_renders_memory_and_skills() {
    let gateway = MockServer::start().await;
    mount_tool(
        &gateway,
        "hivemind_read",
        json!({
            "success": true,
            "data": [
                { "CATEGORY": "DEAL", "SUMMARY": "LOI signed", "WORKSTREAM": "M&A" },
                { "CATEGORY": "NOTE", "SUMMARY": "Board prep" }
            ]
        }),
    )
    .await;
    mount_tool(
        &gateway,
        "sm_query_snowflake",
        json!({ "success": true, "data": [{ "SKILL_NAME": "triage", "TIER": "HOT" }] }),
    )
    .await;

    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "anthropic-test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "message" })))
        .expect(1)
        .mount(&provider)
        .await;

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(chat(json!({
            "model": "Claude-Sonnet-4",
            "focus": "portfolio",
            "temperature": 0.3,
            "messages": [{ "role": "user", "content": "continue" }]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = only_request_body(&provider).await;
    assert_eq!(sent["model"], "Claude-Sonnet-4");
    assert_eq!(sent["temperature"], 0.3);
    assert_eq!(sent["messages"], json!([{ "role": "user", "content": "continue" }]));

    let system = sent["system"].as_str().unwrap();
    assert!(system.contains("- Focus: portfolio"));
    assert!(system.contains("- [DEAL] LOI signed (M&A)\n- [NOTE] Board prep"));
    assert!(system.contains("- triage (HOT)"));
}

#[tokio::test]
async fn explicit_system_prompt_bypasses_gateway() {
    let gateway = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway)
        .await;

    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&provider)
        .await;

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(chat(json!({
            "model": "grok-3",
            "system": "Answer in one word.",
            "messages": [{ "role": "user", "content": "ready?" }]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = only_request_body(&provider).await;
    assert_eq!(
        sent["messages"][0],
        json!({ "role": "system", "content": "Answer in one word." })
    );
}

#[tokio::test]
async fn gateway_outage_still_reaches_provider() {
    let gateway = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&gateway)
        .await;

    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .expect(1)
        .mount(&provider)
        .await;

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(chat(json!({
            "model": "gemini-2.0-flash",
            "messages": [{ "role": "user", "content": "hi" }]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = only_request_body(&provider).await;
    let system = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(system.contains("## Recent Hive Mind Context\n(no data)"));
    assert!(system.contains("## Active Skills\n(no data)"));
    assert_eq!(sent["contents"][0]["parts"][0]["text"], "hi");
}

#[tokio::test]
async fn provider_failure_status_is_relayed() {
    let gateway = MockServer::start().await;
    mount_tool(&gateway, "hivemind_read", json!({ "success": true, "data": [] })).await;
    mount_tool(&gateway, "sm_query_snowflake", json!({ "success": true, "data": [] })).await;

    let provider = MockServer::start().await;
    let error = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(529).set_body_raw(error, "application/json"))
        .expect(1)
        .mount(&provider)
        .await;

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(chat(json!({
            "messages": [{ "role": "user", "content": "hi" }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 529);
    assert_eq!(body_bytes(response).await, error.as_bytes());
}

#[tokio::test]
async fn wrong_method_makes_no_outbound_calls() {
    let gateway = MockServer::start().await;
    let provider = MockServer::start().await;
    for server in [&gateway, &provider] {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(server)
            .await;
    }

    let app = router(config(&gateway, &provider));
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, json!({ "error": "Method not allowed" }));
}
