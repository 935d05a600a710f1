//! Upstream HTTP dispatch.
//!
//! Sends a built [`ProviderHttpRequest`] and hands back whatever the
//! provider answered. Non-2xx statuses are replies, not errors: only a
//! failed exchange (connect, TLS, timeout, truncated body) is reported
//! as [`DispatchError::Transport`].

use std::time::Duration;

use abbi_core::{DispatchError, ProviderHttpRequest, UpstreamReply};
use tracing::{debug, info, warn};

/// Shared HTTP client for all provider calls.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    /// Create a dispatcher whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport {
                provider: "client".into(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Perform the upstream call.
    ///
    /// Logs the family, URL and status only; headers and query pairs carry
    /// credentials and are never written out.
    pub async fn send(&self, request: ProviderHttpRequest) -> Result<UpstreamReply, DispatchError> {
        let provider = request.family.as_str();
        debug!(provider, url = %request.url, "Dispatching provider request");

        let transport = |e: reqwest::Error| DispatchError::Transport {
            provider: provider.to_string(),
            message: e.without_url().to_string(),
        };

        // Headers go on before the body: `json()` only sets Content-Type
        // when absent, while `header()` appends.
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let builder = builder.json(&request.body);

        let response = builder.send().await.map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(transport)?.to_vec();

        if (200..300).contains(&status) {
            info!(provider, status, bytes = body.len(), "Provider replied");
        } else {
            warn!(provider, status, "Provider returned an error status; relaying");
        }

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
