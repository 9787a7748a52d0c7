//! # Transport Abstraction Layer
//!
//! Trait and implementations for fetching hypermedia resources.
//!
//! The transport module defines how halbind talks to an API server:
//!
//! - [`Transport`] - Core trait for issuing one GET and returning the JSON
//!   envelope
//! - [`HttpTransport`] - Production transport using reqwest
//! - [`MockTransport`] - Test transport with canned routes, request
//!   recording, and invocation counting
//!
//! The trait is the only place the crate touches a network: everything
//! above it (cache, crawler, formatter) is transport-agnostic and testable
//! offline.
//!
//! ## Creating Transports
//!
//! Use [`create_transport`] to instantiate a transport by name:
//!
//! ```rust
//! use halbind::transport::create_transport;
//!
//! assert!(create_transport("http").is_ok());
//! assert!(create_transport("mock").is_ok());
//! assert!(create_transport("carrier-pigeon").is_err());
//! ```

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Core trait for fetching one resource envelope.
///
/// Implementations issue exactly one GET per call and return the raw
/// (un-normalized) JSON body. There is no retry, no timeout, and no
/// cancellation at this layer: a transport that never completes leaves its
/// crawl branch pending forever, which is the documented behavior.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (e.g. "http", "mock")
    fn name(&self) -> &str;

    /// Fetch the resource at `url` and return its JSON envelope.
    async fn fetch(&self, url: &str) -> Result<Value>;
}

/// Create a transport instance by name
///
/// | Name | Description |
/// |------|-------------|
/// | `http` | reqwest-backed production transport |
/// | `mock` | canned responses for tests |
pub fn create_transport(name: &str) -> Result<Box<dyn Transport>> {
    match name.to_lowercase().as_str() {
        "http" => Ok(Box::new(HttpTransport::new())),
        "mock" => Ok(Box::new(MockTransport::new())),
        _ => anyhow::bail!("Unknown transport: '{}'. Available: http, mock", name),
    }
}
