//! Scripted agent service built on the crate's mock adapters.

pub use weft::adapters::mock::{MockHttpClient, MockResponse};
pub use weft::adapters::InMemoryStore;
pub use weft::thread::{AUTH_TOKEN_KEY, THREAD_ID_KEY};

use serde_json::json;

use super::MOCK_BASE;

#[allow(dead_code)]
pub fn stream_url(thread_id: &str) -> String {
    format!("{}/thread/{}/stream", MOCK_BASE, thread_id)
}

#[allow(dead_code)]
pub fn thread_url(thread_id: &str) -> String {
    format!("{}/thread/{}", MOCK_BASE, thread_id)
}

#[allow(dead_code)]
pub fn threads_url() -> String {
    format!("{}/threads", MOCK_BASE)
}

/// A service that hands out `thread_id` on create, has no prior state for
/// it, and answers its run with `run`. The store starts empty.
#[allow(dead_code)]
pub fn scripted_agent(thread_id: &str, run: MockResponse) -> (MockHttpClient, InMemoryStore) {
    let http = MockHttpClient::new();
    http.on_post(&threads_url(), MockResponse::json(200, json!({ "thread_id": thread_id })));
    http.on_get(
        &thread_url(thread_id),
        MockResponse::json(404, json!({"detail": "Thread not found"})),
    );
    http.on_post(&stream_url(thread_id), run);
    (http, InMemoryStore::new())
}
