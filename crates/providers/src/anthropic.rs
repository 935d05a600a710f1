//! Anthropic Messages API adapter.
//!
//! Wire shape:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as a top-level field, not a message
//! - `tools` only when non-empty
//!
//! The Bedrock/Nova family rides on the same endpoint and shape with the
//! model pinned to the Anthropic default.

use abbi_core::{ChatAdapter, ChatRequest, ProviderFamily, ProviderHttpRequest};
use serde_json::json;

const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic native Messages API adapter.
pub struct AnthropicAdapter {
    family: ProviderFamily,
    base_url: String,
    api_key: String,
    default_model: String,
}

impl AnthropicAdapter {
    /// Create a new Anthropic adapter.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            family: ProviderFamily::Anthropic,
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.into(),
        }
    }

    /// Bedrock/Nova compatibility: Anthropic endpoint and key, default model.
    pub fn bedrock(api_key: impl Into<String>) -> Self {
        Self {
            family: ProviderFamily::Bedrock,
            ..Self::new(api_key)
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        match self.family {
            ProviderFamily::Bedrock => &self.default_model,
            _ => request.model.as_deref().unwrap_or(&self.default_model),
        }
    }
}

impl ChatAdapter for AnthropicAdapter {
    fn family(&self) -> ProviderFamily {
        self.family
    }

    fn endpoint(&self, _model: &str) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, request: &ChatRequest, system_prompt: &str) -> ProviderHttpRequest {
        let model = self.model_for(request);

        let mut body = json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "system": system_prompt,
            "messages": request.messages,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools);
        }

        ProviderHttpRequest {
            family: self.family,
            url: self.endpoint(model),
            query: Vec::new(),
            headers: vec![
                ("x-api-key".into(), self.api_key.clone()),
                ("anthropic-version".into(), ANTHROPIC_VERSION.into()),
                ("Content-Type".into(), "application/json".into()),
            ],
            body,
        }
    }
}
