//! Test doubles for the injected seams.
//!
//! - [`MockHttpClient`] - scripted routes, recorded requests, byte-chunk streams
//! - [`InMemoryStore`] - shared in-memory key-value slots

pub mod http;
pub mod store;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use store::InMemoryStore;
