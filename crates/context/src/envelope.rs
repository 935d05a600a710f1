//! JSON-RPC envelope for the tool gateway.
//!
//! Requests are `{"jsonrpc":"2.0","method":"tools/call","params":{name,arguments},"id"}`.
//! Replies nest a second JSON document, serialized as a string, inside the
//! first `result.content[]` element whose `type` is `"text"`. Decoding that
//! is a separate, pure step so failure handling stays in one place.

use abbi_core::GatewayError;
use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";
pub const TOOLS_CALL: &str = "tools/call";

#[derive(Debug, Serialize)]
struct ToolCallRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: ToolCallParams<'a>,
    id: i64,
}

#[derive(Debug, Serialize)]
struct ToolCallParams<'a> {
    name: &'a str,
    arguments: serde_json::Value,
}

/// Build a `tools/call` request. The id is a millisecond timestamp: replies
/// are correlated by the HTTP exchange, not by id.
pub fn tool_call(name: &str, arguments: serde_json::Value) -> serde_json::Value {
    let request = ToolCallRequest {
        jsonrpc: JSONRPC_VERSION,
        method: TOOLS_CALL,
        params: ToolCallParams { name, arguments },
        id: chrono::Utc::now().timestamp_millis(),
    };
    serde_json::to_value(request).unwrap_or(serde_json::Value::Null)
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<RpcResult>,
}

#[derive(Debug, Deserialize)]
struct RpcResult {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Extract and parse the nested payload from a gateway reply.
pub fn decode_tool_reply(reply: &serde_json::Value) -> Result<serde_json::Value, GatewayError> {
    let parsed = RpcReply::deserialize(reply).map_err(|_| GatewayError::MissingPayload)?;

    let text = parsed
        .result
        .into_iter()
        .flat_map(|r| r.content)
        .find(|item| item.kind == "text")
        .and_then(|item| item.text)
        .ok_or(GatewayError::MissingPayload)?;

    serde_json::from_str(&text).map_err(|e| GatewayError::MalformedPayload(e.to_string()))
}

/// The `{success, data | error}` convention most gateway tools follow.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolPayload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ToolPayload {
    /// `data` when the tool reported success, otherwise its error text.
    pub fn into_data(self) -> Result<serde_json::Value, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("tool reported success without data".into()),
            (false, _) => Err(self
                .error
                .map(|e| match e {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "tool reported failure".into())),
        }
    }
}
