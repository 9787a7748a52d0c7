//! Per-page session
//!
//! The state a binding run needs (API key, base URL, the cache) lives
//! here, constructed once per page load from a validated [`Bootstrap`] and
//! a [`Transport`], and passed through every component call. One session
//! per page; hosts must serialize entry into [`Session::run`] (the
//! pipeline is one logical task, suspending only at fetch boundaries).
//! Discard the session when the page goes away.

use std::sync::Arc;
use url::Url;

use crate::binding::BindingTable;
use crate::bootstrap::Bootstrap;
use crate::cache::ResourceCache;
use crate::crawler::{crawl, CrawlReport};
use crate::error::BindError;
use crate::transport::Transport;

/// One page load's worth of binding state.
pub struct Session {
    bootstrap: Bootstrap,
    cache: ResourceCache,
    base: Url,
}

impl Session {
    /// Build a session. The bootstrap has already been validated; the only
    /// failure left is an unparseable base URL.
    pub fn new(bootstrap: Bootstrap, transport: Arc<dyn Transport>) -> Result<Self, BindError> {
        let base = Url::parse(bootstrap.base_url()).map_err(|e| BindError::BadUrl {
            url: bootstrap.base_url().to_string(),
            details: e.to_string(),
        })?;
        let cache = ResourceCache::new(transport, bootstrap.api_key.clone());
        Ok(Self {
            bootstrap,
            cache,
            base,
        })
    }

    /// The fully resolved URL of the session's root resource.
    pub fn root_url(&self) -> Result<Url, BindError> {
        self.base
            .join(&self.bootstrap.root_path())
            .map_err(|e| BindError::BadUrl {
                url: format!("{}{}", self.base, self.bootstrap.root_path()),
                details: e.to_string(),
            })
    }

    /// Fetch the root resource and resolve the table against it.
    ///
    /// An empty table short-circuits with zero network activity. A root
    /// fetch failure is not fatal: per the error model it leaves every
    /// binding pending, reported but never raised. Errors out of `run` are
    /// only the pre-network kind (malformed root URL).
    pub async fn run(&self, table: &mut BindingTable) -> Result<CrawlReport, BindError> {
        if table.is_empty() {
            tracing::debug!("no bindings declared; skipping root fetch");
            return Ok(CrawlReport::from_table(table));
        }

        let root_url = self.root_url()?;
        tracing::info!(
            entity_type = %self.bootstrap.entity_type,
            entity_id = %self.bootstrap.entity_id,
            url = %root_url,
            "resolving bindings"
        );

        match self.cache.get(root_url.as_str()).await {
            Ok(root) => crawl(&self.cache, table, &root).await,
            Err(error) => {
                tracing::warn!(url = %root_url, %error, "root fetch failed; all bindings stay pending");
            }
        }

        let report = CrawlReport::from_table(table);
        tracing::info!(
            resolved = report.resolved,
            pending = report.pending.len(),
            "crawl finished"
        );
        Ok(report)
    }

    /// The session's cache, exposed for observability.
    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::Mode;
    use crate::render::SlotBoard;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn bootstrap() -> Bootstrap {
        Bootstrap::resolve(Some("k".into()), Some("group".into()), Some("109".into()))
            .unwrap()
            .with_mode(Mode::Debug)
    }

    #[test]
    fn root_url_joins_base_and_path() {
        let session = Session::new(bootstrap(), Arc::new(MockTransport::new())).unwrap();
        assert_eq!(
            session.root_url().unwrap().as_str(),
            "https://api-test.w3.org/groups/109"
        );
    }

    #[tokio::test]
    async fn empty_table_triggers_zero_network_calls() {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(bootstrap(), mock.clone()).unwrap();
        let mut table = BindingTable::new();

        let report = session.run(&mut table).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn run_resolves_against_root_resource() {
        let mock = Arc::new(MockTransport::new());
        mock.route(
            "https://api-test.w3.org/groups/109",
            json!({"name": "Systems WG"}),
        );
        let session = Session::new(bootstrap(), mock.clone()).unwrap();

        let board = SlotBoard::new();
        let mut table = BindingTable::new();
        table
            .push("name", vec![Box::new(board.target("title"))])
            .unwrap();

        let report = session.run(&mut table).await.unwrap();

        assert_eq!(report.resolved, 1);
        assert!(report.is_complete());
        assert_eq!(board.markup("title"), Some("Systems WG".into()));
    }

    #[tokio::test]
    async fn root_fetch_failure_reports_all_pending() {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(bootstrap(), mock.clone()).unwrap();

        let board = SlotBoard::new();
        let mut table = BindingTable::new();
        table
            .push("name", vec![Box::new(board.target("title"))])
            .unwrap();

        let report = session.run(&mut table).await.unwrap();

        assert_eq!(report.resolved, 0);
        assert_eq!(report.pending, vec!["name".to_string()]);
        assert_eq!(board.markup("title"), None);
    }
}
