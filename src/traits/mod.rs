//! Injected seams.
//!
//! - [`HttpClient`] - requests to the agent service (GET, POST, streaming POST)
//! - [`KeyValueStore`] - persisted thread id and bearer credential

pub mod http;
pub mod store;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
pub use store::KeyValueStore;
