//! Configuration loading, validation, and management for ABBI.
//!
//! Loads configuration from `~/.abbi/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! Provider credentials are resolved lazily, on every call, from the config
//! file first and the process environment second. They are never printed:
//! `Debug` redacts them and [`AppConfig::redacted_toml`] drops them.

use abbi_core::ProviderFamily;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.abbi/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model used when a chat request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote tool gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Context assembly settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Outbound provider call timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Provider-specific overrides, keyed by family name ("anthropic", "openai", ...)
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_provider_timeout() -> u64 {
    300
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("default_model", &self.default_model)
            .field("server", &self.server)
            .field("gateway", &self.gateway)
            .field("context", &self.context)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("providers", &self.providers)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body size limit in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}
fn default_body_limit() -> usize {
    4 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the tool gateway; `/mcp` and `/health` are appended
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8085".into()
}
fn default_gateway_timeout() -> u64 {
    15
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Recent shared-memory entries folded into the system prompt
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,

    /// Active skills folded into the system prompt
    #[serde(default = "default_skills_limit")]
    pub skills_limit: usize,

    /// Overall deadline for context assembly, in milliseconds
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_memory_limit() -> usize {
    5
}
fn default_skills_limit() -> usize {
    10
}
fn default_deadline_ms() -> u64 {
    10_000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            memory_limit: default_memory_limit(),
            skills_limit: default_skills_limit(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl ContextConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.abbi/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and validate:
    /// - `ABBI_GATEWAY_URL`
    /// - `ABBI_HOST`, `ABBI_PORT`
    /// - `ABBI_DEFAULT_MODEL`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("ABBI_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Some(host) = lookup("ABBI_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ABBI_PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("ABBI_PORT is not a port number: {port}"))
            })?;
        }
        if let Some(model) = lookup("ABBI_DEFAULT_MODEL") {
            self.default_model = model;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".abbi")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.gateway.url.starts_with("http://") && !self.gateway.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "gateway.url must be an http(s) URL, got {}",
                self.gateway.url
            )));
        }

        if self.context.memory_limit == 0 || self.context.skills_limit == 0 {
            return Err(ConfigError::ValidationError(
                "context limits must be greater than 0".into(),
            ));
        }

        for name in self.providers.keys() {
            if name.parse::<ProviderFamily>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "unknown provider section [providers.{name}]"
                )));
            }
        }

        Ok(())
    }

    /// Sections consulted for `family`, most specific first. Bedrock rides on
    /// the Anthropic endpoint, so `[providers.anthropic]` backs it.
    fn sections(&self, family: ProviderFamily) -> impl Iterator<Item = &ProviderConfig> {
        let fallback = match family {
            ProviderFamily::Bedrock => Some(ProviderFamily::Anthropic),
            _ => None,
        };
        std::iter::once(family)
            .chain(fallback)
            .filter_map(|f| self.providers.get(f.as_str()))
    }

    /// Resolve the credential for `family`: config file first, then the
    /// family's environment variables in order.
    pub fn credential(&self, family: ProviderFamily) -> Option<String> {
        self.credential_with(family, |name| std::env::var(name).ok())
    }

    /// Like [`credential`](Self::credential) with an injectable environment.
    pub fn credential_with(
        &self,
        family: ProviderFamily,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        self.sections(family)
            .find_map(|p| p.api_key.clone().filter(|key| !key.is_empty()))
            .or_else(|| family.credential_env().iter().find_map(|name| lookup(name)))
            .filter(|key| !key.is_empty())
    }

    /// Base URL override for `family`, if configured.
    pub fn base_url(&self, family: ProviderFamily) -> Option<&str> {
        self.sections(family).find_map(|p| p.api_url.as_deref())
    }

    /// Default model override for `family`, if configured.
    pub fn family_default_model(&self, family: ProviderFamily) -> Option<&str> {
        self.sections(family).find_map(|p| p.default_model.as_deref())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// The effective configuration as TOML, with every credential removed.
    pub fn redacted_toml(&self) -> String {
        let mut copy = self.clone();
        for provider in copy.providers.values_mut() {
            provider.api_key = None;
        }
        toml::to_string_pretty(&copy).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            server: ServerConfig::default(),
            gateway: GatewayConfig::default(),
            context: ContextConfig::default(),
            provider_timeout_secs: default_provider_timeout(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.context.memory_limit, 5);
        assert_eq!(config.context.skills_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.gateway.url, config.gateway.url);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn loads_provider_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_model = "gpt-4o"

[gateway]
url = "https://gateway.internal"

[providers.openai]
api_key = "sk-file"
api_url = "http://localhost:9999/v1"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.gateway.url, "https://gateway.internal");
        assert_eq!(
            config.base_url(ProviderFamily::OpenAi),
            Some("http://localhost:9999/v1")
        );
    }

    #[test]
    fn unparsable_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn unknown_provider_section_rejected() {
        let mut config = AppConfig::default();
        config
            .providers
            .insert("mistral".into(), ProviderConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_gateway_rejected() {
        let mut config = AppConfig::default();
        config.gateway.url = "gateway.internal".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn credential_prefers_config_over_env() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("from-file".into()),
                ..Default::default()
            },
        );
        let lookup = env(&[("ANTHROPIC_API_KEY", "from-env")]);
        assert_eq!(
            config.credential_with(ProviderFamily::Anthropic, &lookup),
            Some("from-file".into())
        );
    }

    #[test]
    fn credential_falls_back_through_env_vars() {
        let config = AppConfig::default();
        let lookup = env(&[("GOOGLE_API_KEY", "g-key")]);
        assert_eq!(
            config.credential_with(ProviderFamily::Gemini, &lookup),
            Some("g-key".into())
        );
        assert_eq!(config.credential_with(ProviderFamily::Grok, &lookup), None);
    }

    #[test]
    fn bedrock_uses_anthropic_key() {
        let config = AppConfig::default();
        let lookup = env(&[("ANTHROPIC_API_KEY", "ant")]);
        assert_eq!(
            config.credential_with(ProviderFamily::Bedrock, &lookup),
            Some("ant".into())
        );
    }

    #[test]
    fn bedrock_reads_anthropic_section() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("file-ant-key".into()),
                api_url: Some("http://proxy.internal".into()),
                ..Default::default()
            },
        );
        let lookup = env(&[]);
        assert_eq!(
            config.credential_with(ProviderFamily::Bedrock, &lookup),
            Some("file-ant-key".into())
        );
        assert_eq!(
            config.base_url(ProviderFamily::Bedrock),
            Some("http://proxy.internal")
        );
    }

    #[test]
    fn bedrock_section_wins_over_anthropic() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "anthropic".into(),
            ProviderConfig {
                api_key: Some("ant".into()),
                api_url: Some("http://anthropic.internal".into()),
                ..Default::default()
            },
        );
        config.providers.insert(
            "bedrock".into(),
            ProviderConfig {
                api_url: Some("http://bedrock.internal".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            config.base_url(ProviderFamily::Bedrock),
            Some("http://bedrock.internal")
        );
        assert_eq!(
            config.credential_with(ProviderFamily::Bedrock, env(&[])),
            Some("ant".into())
        );
        assert_eq!(config.base_url(ProviderFamily::OpenAi), None);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("ABBI_GATEWAY_URL", "https://gw.example"),
                ("ABBI_PORT", "8088"),
                ("ABBI_DEFAULT_MODEL", "gemini-2.0-flash"),
            ]))
            .unwrap();
        assert_eq!(config.gateway.url, "https://gw.example");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.default_model, "gemini-2.0-flash");
    }

    #[test]
    fn bad_port_override_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(env(&[("ABBI_PORT", "http")])).is_err());
    }

    #[test]
    fn secrets_never_printed() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                api_key: Some("sk-very-secret".into()),
                ..Default::default()
            },
        );
        assert!(!format!("{config:?}").contains("sk-very-secret"));
        assert!(!config.redacted_toml().contains("sk-very-secret"));
    }
}
