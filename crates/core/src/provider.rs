//! Provider abstraction: the seam between the canonical chat request and
//! each LLM backend's wire format.
//!
//! An adapter is a pure translation: it never performs I/O. Sending the
//! resulting [`ProviderHttpRequest`] is the dispatcher's job, which keeps
//! payload shaping testable without a network.

use serde::{Deserialize, Serialize};

use crate::message::ChatRequest;

/// The closed set of backend families the router can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    Anthropic,
    OpenAi,
    Gemini,
    Grok,
    Bedrock,
    Copilot,
}

impl ProviderFamily {
    /// All families, in routing priority order.
    pub const ALL: [ProviderFamily; 6] = [
        Self::Anthropic,
        Self::OpenAi,
        Self::Gemini,
        Self::Grok,
        Self::Bedrock,
        Self::Copilot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::Bedrock => "bedrock",
            Self::Copilot => "copilot",
        }
    }

    /// Environment variables consulted for this family's credential, in order.
    ///
    /// Bedrock rides on the Anthropic endpoint and therefore its key.
    pub fn credential_env(&self) -> &'static [&'static str] {
        match self {
            Self::Anthropic | Self::Bedrock => &["ANTHROPIC_API_KEY"],
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::Grok => &["XAI_API_KEY"],
            Self::Copilot => &["GITHUB_COPILOT_TOKEN"],
        }
    }
}

impl std::fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown provider family: {s}"))
    }
}

/// Header names whose values must never appear in logs or debug output.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-api-key"];

/// Query parameters whose values must never appear in logs or debug output.
const SENSITIVE_QUERY: &[&str] = &["key"];

/// A fully-shaped outbound provider call.
#[derive(Clone, PartialEq)]
pub struct ProviderHttpRequest {
    pub family: ProviderFamily,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl ProviderHttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn redact_pairs<'a>(
    pairs: &'a [(String, String)],
    sensitive: &'a [&'a str],
) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .map(|(k, v)| {
            if sensitive.iter().any(|s| k.eq_ignore_ascii_case(s)) {
                (k.as_str(), "[REDACTED]")
            } else {
                (k.as_str(), v.as_str())
            }
        })
        .collect()
}

impl std::fmt::Debug for ProviderHttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHttpRequest")
            .field("family", &self.family)
            .field("url", &self.url)
            .field("query", &redact_pairs(&self.query, SENSITIVE_QUERY))
            .field("headers", &redact_pairs(&self.headers, SENSITIVE_HEADERS))
            .field("body", &self.body)
            .finish()
    }
}

/// The provider's answer, kept byte-for-byte so it can be relayed verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Per-family translation from [`ChatRequest`] to a provider call.
///
/// Implementations hold only immutable settings (endpoint, credential,
/// default model) and are built fresh for each request.
pub trait ChatAdapter: Send + Sync {
    fn family(&self) -> ProviderFamily;

    /// The endpoint this adapter posts to (without credentials).
    fn endpoint(&self, model: &str) -> String;

    /// The model used when the request names none.
    fn default_model(&self) -> &str;

    /// Shape the request for this provider.
    fn build_request(&self, request: &ChatRequest, system_prompt: &str) -> ProviderHttpRequest;
}
