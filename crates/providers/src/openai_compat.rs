//! OpenAI-compatible chat completions adapter.
//!
//! Serves OpenAI itself, Grok (xAI) and GitHub Copilot, which all accept
//! the `/chat/completions` shape:
//! - system prompt as a synthetic leading `role: "system"` message
//! - `Authorization: Bearer <key>`

use abbi_core::{ChatAdapter, ChatRequest, ProviderFamily, ProviderHttpRequest};
use serde_json::json;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

pub const GROK_BASE_URL: &str = "https://api.x.ai/v1";
pub const GROK_DEFAULT_MODEL: &str = "grok-3";

pub const COPILOT_BASE_URL: &str = "https://api.githubcopilot.com";
pub const COPILOT_DEFAULT_MODEL: &str = "gpt-4o";
const COPILOT_INTEGRATION_ID: &str = "vscode-chat";

/// An OpenAI-compatible chat adapter.
pub struct OpenAiCompatAdapter {
    family: ProviderFamily,
    base_url: String,
    api_key: String,
    default_model: String,
    extra_headers: Vec<(String, String)>,
}

impl OpenAiCompatAdapter {
    /// Create a new OpenAI-compatible adapter.
    pub fn new(
        family: ProviderFamily,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            family,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: default_model.into(),
            extra_headers: Vec::new(),
        }
    }

    /// OpenAI (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(ProviderFamily::OpenAi, OPENAI_BASE_URL, api_key, OPENAI_DEFAULT_MODEL)
    }

    /// Grok via xAI (convenience constructor).
    pub fn grok(api_key: impl Into<String>) -> Self {
        Self::new(ProviderFamily::Grok, GROK_BASE_URL, api_key, GROK_DEFAULT_MODEL)
    }

    /// GitHub Copilot chat (convenience constructor).
    pub fn copilot(api_key: impl Into<String>) -> Self {
        Self::new(
            ProviderFamily::Copilot,
            COPILOT_BASE_URL,
            api_key,
            COPILOT_DEFAULT_MODEL,
        )
        .with_header("Copilot-Integration-Id", COPILOT_INTEGRATION_ID)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Synthetic system message followed by the caller's turns.
    fn to_api_messages(request: &ChatRequest, system_prompt: &str) -> Vec<serde_json::Value> {
        std::iter::once(json!({ "role": "system", "content": system_prompt }))
            .chain(request.messages.iter().map(|m| json!(m)))
            .collect()
    }
}

impl ChatAdapter for OpenAiCompatAdapter {
    fn family(&self) -> ProviderFamily {
        self.family
    }

    fn endpoint(&self, _model: &str) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, request: &ChatRequest, system_prompt: &str) -> ProviderHttpRequest {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let mut body = json!({
            "model": model,
            "messages": Self::to_api_messages(request, system_prompt),
            "max_tokens": request.max_tokens,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools);
        }

        let mut headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(self.extra_headers.iter().cloned());

        ProviderHttpRequest {
            family: self.family,
            url: self.endpoint(model),
            query: Vec::new(),
            headers,
            body,
        }
    }
}
