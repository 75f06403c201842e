//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{scripted_agent, test_thread_id};
//!
//! let (mock, store) = scripted_agent(&test_thread_id(), MockResponse::chunks(["..."]));
//! let mut session = mock_session(&mock, &store);
//! ```

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use weft::config::ClientConfig;
use weft::session::Session;

/// Base URL the mock HTTP client answers on.
pub const MOCK_BASE: &str = "http://agent.test";

/// Helper to create a thread ID for testing.
pub fn test_thread_id() -> String {
    "test-thread-123".to_string()
}

/// Helper to create a test token.
#[allow(dead_code)]
pub fn test_token() -> String {
    "test-auth-token".to_string()
}

/// Session over the given mocks, pointed at [`MOCK_BASE`].
#[allow(dead_code)]
pub fn mock_session(http: &MockHttpClient, store: &InMemoryStore) -> Session {
    let config = ClientConfig::default().with_base_url(MOCK_BASE);
    Session::new(Arc::new(http.clone()), Arc::new(store.clone()), &config)
}

/// One SSE-style record: `event: <event>` then `data: <json>` and a blank line.
#[allow(dead_code)]
pub fn record(event: &str, data: serde_json::Value) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// One NDJSON line.
#[allow(dead_code)]
pub fn line(data: serde_json::Value) -> String {
    format!("{}\n", data)
}
