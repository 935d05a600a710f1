//! Shared fixtures for router tests.

use std::sync::Arc;

use abbi_config::{AppConfig, ProviderConfig};
use abbi_core::ProviderFamily;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};

use crate::{AppState, build_router};

/// Discard port; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Config pointing the gateway and every provider family at test servers,
/// with a fixed `<family>-key` credential per family.
pub fn config_for(gateway_url: &str, provider_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.gateway.url = gateway_url.to_string();
    for family in ProviderFamily::ALL {
        config.providers.insert(
            family.as_str().to_string(),
            ProviderConfig {
                api_key: Some(format!("{family}-key")),
                api_url: Some(provider_url.to_string()),
                default_model: None,
            },
        );
    }
    config
}

pub fn app(config: AppConfig) -> Router {
    build_router(Arc::new(AppState::from_config(config).unwrap()))
}

/// Gateway reply carrying `payload` as its nested text document.
pub fn envelope(payload: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": { "content": [{ "type": "text", "text": payload.to_string() }] }
    })
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
