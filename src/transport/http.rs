//! HTTP transport using reqwest
//!
//! One GET per fetch, JSON accept header, no retries. Authentication is a
//! pre-shared API key that the cache layer has already merged into the
//! query string by the time a URL reaches this transport.

use super::Transport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Production transport backed by a shared reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        tracing::debug!(transport = "http", url = %url, "GET");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                transport = "http",
                url = %url,
                status = %status,
                "API error"
            );
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let envelope: Value = response
            .json()
            .await
            .context("Failed to parse response body as JSON")?;

        tracing::debug!(transport = "http", url = %url, status = %status, "response received");

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_transport_name() {
        assert_eq!(HttpTransport::new().name(), "http");
    }
}
