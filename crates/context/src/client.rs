//! HTTP client for the remote tool gateway.
//!
//! The gateway speaks JSON-RPC over `POST {base}/mcp` and exposes a plain
//! `GET {base}/health`. No retries happen here; callers own retry policy.

use abbi_core::GatewayError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::envelope;

/// Anything that can carry JSON-RPC traffic to the tool gateway.
///
/// `call_tool` is provided on top of `post_rpc`, so fakes only need to
/// answer raw envelopes.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Post a JSON-RPC body and return the reply document untouched.
    async fn post_rpc(&self, body: &serde_json::Value) -> Result<serde_json::Value, GatewayError>;

    /// Gateway liveness document.
    async fn health(&self) -> Result<serde_json::Value, GatewayError>;

    /// Invoke a named tool and return its decoded nested payload.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = envelope::tool_call(name, arguments);
        let reply = self.post_rpc(&request).await?;
        envelope::decode_tool_reply(&reply)
    }
}

/// reqwest-backed [`ToolGateway`].
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    /// Create a client with a per-call timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &abbi_config::GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(&config.url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("gateway returned HTTP {status}")));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("unreadable gateway reply: {e}")))
    }
}

#[async_trait]
impl ToolGateway for GatewayClient {
    async fn post_rpc(&self, body: &serde_json::Value) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}/mcp", self.base_url);
        debug!(
            tool = body["params"]["name"].as_str().unwrap_or("-"),
            "Sending gateway request"
        );

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn health(&self) -> Result<serde_json::Value, GatewayError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::read_json(response).await
    }
}
