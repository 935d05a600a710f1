//! `POST /api/chat`: one chat turn.
//!
//! validate → system prompt (caller's own, or assembled context rendered
//! into the template) → route by model → build the provider call →
//! dispatch → relay the provider's status, content type and body as-is.

use abbi_context::{SessionParams, render_system_prompt};
use abbi_core::{ChatRequest, UpstreamReply};
use abbi_providers::select_adapter;
use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use tracing::{debug, info};

use crate::SharedState;
use crate::error::ApiError;

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(mut request) = payload?;
    request.validate()?;

    if request.model.as_deref().is_none_or(str::is_empty) {
        request.model = Some(state.config.default_model.clone());
    }
    let model = request.model.clone().unwrap_or_default();

    let system_prompt = match request.system_override() {
        Some(system) => {
            debug!("Caller supplied a system prompt; skipping context assembly");
            system.to_string()
        }
        None => {
            let context = state
                .assembler
                .assemble(state.config.context.memory_limit)
                .await;
            render_system_prompt(&SessionParams::from_request(&request), &context)
        }
    };

    let adapter = select_adapter(&model, &state.config);
    let upstream = adapter.build_request(&request, &system_prompt);

    info!(
        model = %model,
        provider = %adapter.family(),
        messages = request.messages.len(),
        "Dispatching chat turn"
    );

    let reply = state.dispatcher.send(upstream).await?;
    Ok(relay(reply))
}

/// Provider answer → HTTP response, unchanged.
fn relay(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = status;

    if let Some(content_type) = reply
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
    {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }
    response
}
