//! Provider router: picks the adapter for a model identifier.
//!
//! Matching is a case-insensitive substring test over a fixed, ordered
//! table. The first family whose token appears in the model wins, so a
//! model naming two families (e.g. `gpt-on-gemini`) resolves to the one
//! listed earlier. Anything unmatched goes to Anthropic.

use abbi_config::AppConfig;
use abbi_core::{ChatAdapter, ProviderFamily};
use tracing::{debug, warn};

use crate::anthropic::AnthropicAdapter;
use crate::gemini::GeminiAdapter;
use crate::openai_compat::OpenAiCompatAdapter;

/// Routing table in priority order.
pub const ROUTING_TABLE: &[(ProviderFamily, &[&str])] = &[
    (
        ProviderFamily::Anthropic,
        &["claude", "anthropic", "sonnet", "opus", "haiku"],
    ),
    (
        ProviderFamily::OpenAi,
        &["gpt", "openai", "o1-", "o3-", "o4-"],
    ),
    (ProviderFamily::Gemini, &["gemini"]),
    (ProviderFamily::Grok, &["grok", "xai"]),
    (
        ProviderFamily::Bedrock,
        &["bedrock", "nova", "titan", "amazon"],
    ),
    (ProviderFamily::Copilot, &["copilot"]),
];

/// Family for a model identifier. Total: never fails.
pub fn select_family(model: &str) -> ProviderFamily {
    let model = model.to_ascii_lowercase();
    ROUTING_TABLE
        .iter()
        .find(|(_, tokens)| tokens.iter().any(|token| model.contains(token)))
        .map(|(family, _)| *family)
        .unwrap_or(ProviderFamily::Anthropic)
}

/// Adapter for a model identifier, wired with the configured credential,
/// base URL and default model for its family.
pub fn select_adapter(model: &str, config: &AppConfig) -> Box<dyn ChatAdapter> {
    let family = select_family(model);
    debug!(model, family = %family, "Routed model");
    adapter_for(family, config)
}

/// Build the adapter for `family` from configuration.
///
/// Credentials are resolved on every call so that rotated environment
/// variables take effect without a restart.
pub fn adapter_for(family: ProviderFamily, config: &AppConfig) -> Box<dyn ChatAdapter> {
    let api_key = config.credential(family).unwrap_or_else(|| {
        warn!(provider = %family, "No credential configured; upstream will reject the call");
        String::new()
    });
    let base_url = config.base_url(family);
    let default_model = config.family_default_model(family);

    match family {
        ProviderFamily::Anthropic | ProviderFamily::Bedrock => {
            let mut adapter = if family == ProviderFamily::Bedrock {
                AnthropicAdapter::bedrock(api_key)
            } else {
                AnthropicAdapter::new(api_key)
            };
            if let Some(url) = base_url {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = default_model {
                adapter = adapter.with_default_model(model);
            }
            Box::new(adapter)
        }
        ProviderFamily::Gemini => {
            let mut adapter = GeminiAdapter::new(api_key);
            if let Some(url) = base_url {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = default_model {
                adapter = adapter.with_default_model(model);
            }
            Box::new(adapter)
        }
        ProviderFamily::OpenAi | ProviderFamily::Grok | ProviderFamily::Copilot => {
            let mut adapter = match family {
                ProviderFamily::Grok => OpenAiCompatAdapter::grok(api_key),
                ProviderFamily::Copilot => OpenAiCompatAdapter::copilot(api_key),
                _ => OpenAiCompatAdapter::openai(api_key),
            };
            if let Some(url) = base_url {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = default_model {
                adapter = adapter.with_default_model(model);
            }
            Box::new(adapter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abbi_config::ProviderConfig;

    #[test]
    fn anthropic_tokens_any_case() {
        for model in ["claude-sonnet-4-20250514", "CLAUDE-3-OPUS", "Sonnet", "my-haiku"] {
            assert_eq!(select_family(model), ProviderFamily::Anthropic, "{model}");
        }
    }

    #[test]
    fn each_family_routes() {
        assert_eq!(select_family("gpt-4o"), ProviderFamily::OpenAi);
        assert_eq!(select_family("o3-mini"), ProviderFamily::OpenAi);
        assert_eq!(select_family("gemini-2.0-flash"), ProviderFamily::Gemini);
        assert_eq!(select_family("grok-3"), ProviderFamily::Grok);
        assert_eq!(select_family("xai-beta"), ProviderFamily::Grok);
        assert_eq!(select_family("amazon.nova-pro-v1:0"), ProviderFamily::Bedrock);
        assert_eq!(select_family("titan-text"), ProviderFamily::Bedrock);
        assert_eq!(select_family("copilot-chat"), ProviderFamily::Copilot);
    }

    #[test]
    fn earlier_family_wins_on_overlap() {
        assert_eq!(select_family("gpt-on-gemini"), ProviderFamily::OpenAi);
        assert_eq!(select_family("grok-gpt"), ProviderFamily::OpenAi);
        assert_eq!(select_family("copilot-gpt-4o"), ProviderFamily::OpenAi);
        assert_eq!(select_family("claude-via-bedrock"), ProviderFamily::Anthropic);
    }

    #[test]
    fn unknown_and_empty_default_to_anthropic() {
        assert_eq!(select_family("llama-3-70b"), ProviderFamily::Anthropic);
        assert_eq!(select_family(""), ProviderFamily::Anthropic);
    }

    #[test]
    fn routing_table_covers_every_family_once() {
        let families: Vec<_> = ROUTING_TABLE.iter().map(|(f, _)| *f).collect();
        assert_eq!(families, ProviderFamily::ALL);
    }

    #[test]
    fn adapter_honours_config_overrides() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "gemini".into(),
            ProviderConfig {
                api_key: Some("cfg-key".into()),
                api_url: Some("http://127.0.0.1:9999".into()),
                default_model: Some("gemini-1.5-pro".into()),
            },
        );

        let adapter = select_adapter("gemini", &config);
        assert_eq!(adapter.family(), ProviderFamily::Gemini);
        assert_eq!(adapter.default_model(), "gemini-1.5-pro");

        let built = adapter.build_request(&abbi_core::ChatRequest::new(vec![]), "s");
        assert_eq!(
            built.url,
            "http://127.0.0.1:9999/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(built.query_param("key"), Some("cfg-key"));
    }

    #[test]
    fn bedrock_adapter_reports_bedrock_family() {
        let adapter = adapter_for(ProviderFamily::Bedrock, &AppConfig::default());
        assert_eq!(adapter.family(), ProviderFamily::Bedrock);
        assert_eq!(adapter.default_model(), crate::anthropic::DEFAULT_MODEL);
    }

    #[test]
    fn bedrock_uses_anthropic_section_from_config() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("file-ant-key".into()),
                api_url: Some("http://proxy.internal".into()),
                default_model: None,
            },
        );

        let adapter = select_adapter("amazon.nova-pro-v1:0", &config);
        assert_eq!(adapter.family(), ProviderFamily::Bedrock);

        let built = adapter.build_request(&abbi_core::ChatRequest::new(vec![]), "s");
        assert_eq!(built.url, "http://proxy.internal/v1/messages");
        assert_eq!(built.header("x-api-key"), Some("file-ant-key"));
        assert_eq!(built.body["model"], crate::anthropic::DEFAULT_MODEL);
    }
}
