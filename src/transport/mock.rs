//! Mock transport for testing
//!
//! Serves canned envelopes without touching the network, and records every
//! request so tests can assert on invocation counts (the cache contract:
//! one transport call per distinct suffixed URL).

use super::Transport;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock transport serving routed responses.
pub struct MockTransport {
    /// Routes: URL → envelope. Looked up by exact URL first, then with the
    /// query string stripped, so tests can route by bare resource URL
    /// without re-deriving the api-key suffix.
    routes: Arc<Mutex<HashMap<String, Value>>>,
    /// Every fetched URL, in call order (for assertions).
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Route a URL to an envelope.
    pub fn route(&self, url: impl Into<String>, envelope: Value) {
        self.routes.lock().unwrap().insert(url.into(), envelope);
    }

    /// All requests made, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Total number of fetches issued.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of fetches whose URL (query stripped) equals `url`.
    pub fn calls_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| strip_query(r) == url || r.as_str() == url)
            .count()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        let envelope = routes
            .get(url)
            .or_else(|| routes.get(strip_query(url)))
            .cloned();

        match envelope {
            Some(envelope) => Ok(envelope),
            None => anyhow::bail!("no route for {url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn routes_by_exact_url() {
        let mock = MockTransport::new();
        mock.route("https://api.example.org/groups/1?apikey=k", json!({"name": "WG"}));

        let envelope = mock.fetch("https://api.example.org/groups/1?apikey=k").await.unwrap();
        assert_eq!(envelope["name"], "WG");
    }

    #[tokio::test]
    async fn routes_by_query_stripped_url() {
        let mock = MockTransport::new();
        mock.route("https://api.example.org/groups/1", json!({"name": "WG"}));

        let envelope = mock
            .fetch("https://api.example.org/groups/1?apikey=k&embed=true")
            .await
            .unwrap();
        assert_eq!(envelope["name"], "WG");
    }

    #[tokio::test]
    async fn records_requests_in_order() {
        let mock = MockTransport::new();
        mock.route("https://a.example/x", json!(1));
        mock.route("https://a.example/y", json!(2));

        mock.fetch("https://a.example/x?apikey=k").await.unwrap();
        mock.fetch("https://a.example/y?apikey=k").await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls_for("https://a.example/x"), 1);
        assert!(mock.requests()[0].starts_with("https://a.example/x"));
    }

    #[tokio::test]
    async fn unrouted_url_fails() {
        let mock = MockTransport::new();
        let result = mock.fetch("https://a.example/missing").await;
        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
