//! Google Gemini `generateContent` adapter.
//!
//! - roles remapped: `user` stays `user`, every other role becomes `model`
//! - system prompt in `systemInstruction`, separate from `contents`
//! - token limit and temperature under `generationConfig`
//! - credential as the `key` query parameter, never a header

use abbi_core::{ChatAdapter, ChatRequest, ProviderFamily, ProviderHttpRequest};
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiAdapter {
    base_url: String,
    api_key: String,
    default_model: String,
}

impl GeminiAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn gemini_role(role: &str) -> &'static str {
        if role == "user" { "user" } else { "model" }
    }

    fn to_contents(request: &ChatRequest) -> Vec<serde_json::Value> {
        request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": Self::gemini_role(&m.role),
                    "parts": [{ "text": m.content.to_text() }],
                })
            })
            .collect()
    }
}

impl ChatAdapter for GeminiAdapter {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Gemini
    }

    /// The model is a single path segment; `?`, `/` and `#` stay inside it.
    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(model)
        )
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn build_request(&self, request: &ChatRequest, system_prompt: &str) -> ProviderHttpRequest {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let mut generation_config = json!({ "maxOutputTokens": request.max_tokens });
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }

        let mut body = json!({
            "contents": Self::to_contents(request),
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "generationConfig": generation_config,
        });

        if !request.tools.is_empty() {
            body["tools"] = json!(request.tools);
        }

        ProviderHttpRequest {
            family: ProviderFamily::Gemini,
            url: self.endpoint(model),
            query: vec![("key".into(), self.api_key.clone())],
            headers: vec![("Content-Type".into(), "application/json".into())],
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abbi_core::Message;

    #[test]
    fn model_is_escaped_in_path() {
        let req = ChatRequest::new(vec![Message::user("hi")]).with_model("gemini/../x?key=evil#frag");
        let built = GeminiAdapter::new("g").build_request(&req, "s");
        assert_eq!(
            built.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini%2F..%2Fx%3Fkey%3Devil%23frag:generateContent"
        );
        assert_eq!(built.query_param("key"), Some("g"));
    }

    #[test]
    fn single_user_turn_round_trips() {
        let req = ChatRequest::new(vec![Message::user("hi")]);
        let built = GeminiAdapter::new("g").build_request(&req, "s");
        let contents = built.body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn non_user_roles_become_model() {
        let req = ChatRequest::new(vec![
            Message::user("q"),
            Message::assistant("a"),
            Message {
                role: "tool".into(),
                content: "t".into(),
            },
        ]);
        let built = GeminiAdapter::new("g").build_request(&req, "s");
        let roles: Vec<_> = built.body["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, ["user", "model", "model"]);
    }

    #[test]
    fn system_instruction_and_generation_config() {
        let mut req = ChatRequest::new(vec![Message::user("hi")]);
        req.max_tokens = 256;
        req.temperature = Some(0.5);
        let built = GeminiAdapter::new("g").build_request(&req, "be brief");
        assert_eq!(built.body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(built.body["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(built.body["generationConfig"]["temperature"], 0.5);
        assert!(built.body.get("max_tokens").is_none());
    }

    #[test]
    fn credential_only_in_query() {
        let req = ChatRequest::new(vec![]).with_model("gemini-1.5-pro");
        let built = GeminiAdapter::new("gm-key").build_request(&req, "s");
        assert_eq!(built.query_param("key"), Some("gm-key"));
        assert!(built.header("authorization").is_none());
        assert!(built.header("x-api-key").is_none());
        assert!(!built.url.contains("gm-key"));
        assert_eq!(
            built.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
