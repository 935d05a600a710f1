//! HTTP server for ABBI.
//!
//! Exposes the chat dispatch endpoint together with the shared-memory,
//! gateway passthrough, boot-context and conversation storage endpoints.
//!
//! Built on Axum; CORS is permissive because the browser client is served
//! from a different origin.

pub mod api;
pub mod chat;
pub mod error;
pub mod store;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use abbi_config::AppConfig;
use abbi_context::{ContextAssembler, GatewayClient, ToolGateway};
use abbi_providers::Dispatcher;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::{method_not_allowed, preflight};
use crate::store::{ConversationStore, InMemoryStore};

/// Shared application state.
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<dyn ToolGateway>,
    pub assembler: ContextAssembler,
    pub dispatcher: Dispatcher,
    pub store: Arc<dyn ConversationStore>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn ToolGateway>,
        dispatcher: Dispatcher,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        let assembler = ContextAssembler::from_config(gateway.clone(), &config.context);
        Self {
            config,
            gateway,
            assembler,
            dispatcher,
            store,
        }
    }

    /// Wire the real gateway client, dispatcher and an in-memory store.
    pub fn from_config(config: AppConfig) -> abbi_core::Result<Self> {
        let gateway: Arc<dyn ToolGateway> = Arc::new(GatewayClient::from_config(&config.gateway)?);
        let dispatcher = Dispatcher::new(config.provider_timeout())?;
        Ok(Self::new(
            config,
            gateway,
            dispatcher,
            Arc::new(InMemoryStore::new()),
        ))
    }
}

/// Build the router with every route and the shared layers.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/chat",
            post(chat::chat_handler)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/hivemind",
            get(api::hivemind_read)
                .post(api::hivemind_write)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/gateway",
            get(api::gateway_health)
                .post(api::gateway_call)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/boot-context",
            get(api::boot_context)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/conversations/save",
            post(api::save_conversation).fallback(method_not_allowed),
        )
        .route(
            "/api/conversations/list",
            get(api::list_conversations).fallback(method_not_allowed),
        )
        .route(
            "/api/conversations/{id}",
            get(api::load_conversation).fallback(method_not_allowed),
        )
        .route(
            "/api/folders/create",
            post(api::create_folder).fallback(method_not_allowed),
        )
        .route(
            "/api/folders/list",
            get(api::list_folders).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and serve until the process exits.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let gateway_url = config.gateway.url.clone();

    let state = Arc::new(AppState::from_config(config)?);
    let app = build_router(state);

    info!(addr = %addr, gateway = %gateway_url, "ABBI server starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
