//! Shared memory, gateway passthrough, boot context and conversation
//! storage endpoints.
//!
//! - `GET  /api/hivemind`: read shared memory
//! - `POST /api/hivemind`: write shared memory
//! - `GET  /api/gateway`: gateway health
//! - `POST /api/gateway`: raw JSON-RPC passthrough
//! - `GET  /api/boot-context`: full active-skill listing
//! - `POST /api/conversations/save`: append messages to a conversation
//! - `GET  /api/conversations/list`: recent conversations
//! - `GET  /api/conversations/{id}`: one conversation
//! - `POST /api/folders/create`: create a folder
//! - `GET  /api/folders/list`: list folders

use abbi_context::{MemoryFilter, MemoryWrite, hivemind, skills};
use abbi_core::{Message, ValidationError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::SharedState;
use crate::error::ApiError;

const NO_MEMORY_DATA: &str = "No data returned";
const NO_BOOT_CONTEXT: &str = "No boot context data";

// ── Shared memory ─────────────────────────────────────────────────────────

pub async fn hivemind_read(
    State(state): State<SharedState>,
    query: Result<Query<MemoryFilter>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(filter) = query?;
    let payload = hivemind::read(state.gateway.as_ref(), &filter)
        .await
        .map_err(|e| ApiError::tool(e, NO_MEMORY_DATA))?;
    Ok(Json(payload))
}

pub async fn hivemind_write(
    State(state): State<SharedState>,
    body: Result<Json<MemoryWrite>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(entry) = body?;
    entry.validate()?;

    let data = hivemind::write(state.gateway.as_ref(), &entry)
        .await
        .map_err(|e| ApiError::Tool(e.to_string()))?;

    info!(
        category = entry.category.as_deref().unwrap_or_default(),
        "Shared memory entry written"
    );
    Ok(Json(json!({ "success": true, "data": data })))
}

// ── Gateway passthrough ───────────────────────────────────────────────────

pub async fn gateway_health(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    state.gateway.health().await.map(Json).map_err(ApiError::Gateway)
}

pub async fn gateway_call(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    state
        .gateway
        .post_rpc(&body)
        .await
        .map(Json)
        .map_err(ApiError::Gateway)
}

// ── Boot context ──────────────────────────────────────────────────────────

pub async fn boot_context(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    skills::boot_context(state.gateway.as_ref())
        .await
        .map(Json)
        .map_err(|e| ApiError::tool(e, NO_BOOT_CONTEXT))
}

// ── Conversations ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConversation {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn save_conversation(
    State(state): State<SharedState>,
    body: Result<Json<SaveConversation>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;

    let (conversation_id, messages) = match (body.conversation_id, body.messages) {
        (Some(id), Some(messages)) if !id.is_empty() => (id, messages),
        _ => {
            return Err(ValidationError::MissingField("conversationId and messages".into()).into());
        }
    };

    let count = messages.len();
    state
        .store
        .save(
            &conversation_id,
            body.title.as_deref(),
            messages.into_iter().map(|m| (m.role, m.content)).collect(),
        )
        .await?;

    info!(conversation = %conversation_id, messages = count, "Conversation saved");
    Ok(Json(json!({ "success": true, "conversationId": conversation_id })))
}

pub async fn list_conversations(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let conversations = state.store.list().await?;
    Ok(Json(json!({ "conversations": conversations })))
}

pub async fn load_conversation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .store
        .load(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".into()))?;
    Ok(Json(json!(record)))
}

// ── Folders ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateFolder {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub async fn create_folder(
    State(state): State<SharedState>,
    body: Result<Json<CreateFolder>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField("name".into()))?;

    let folder = state.store.create_folder(&name, body.icon.as_deref()).await?;
    info!(folder = %folder.folder_id, "Folder created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "folder": {
                "folderId": folder.folder_id,
                "name": folder.name,
                "icon": folder.icon,
            }
        })),
    ))
}

pub async fn list_folders(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let folders = state.store.list_folders().await?;
    Ok(Json(json!({ "folders": folders })))
}
