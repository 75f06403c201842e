//! Implementations of the seams in `crate::traits`.
//!
//! - [`ReqwestHttpClient`] - HTTP over reqwest
//! - [`FileKeyValueStore`] - JSON file in the data directory
//!
//! The [`mock`] submodule holds the test doubles.

pub mod file_store;
pub mod mock;
pub mod reqwest_http;

pub use file_store::FileKeyValueStore;
pub use mock::{InMemoryStore, MockHttpClient};
pub use reqwest_http::ReqwestHttpClient;
