//! Scripted HTTP client for tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `GET` or `POST`
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (POST only)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

/// What a scripted route answers with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered response with any status
    Success(Response),
    /// Request fails before a response
    Error(HttpError),
    /// Streaming body delivered chunk by chunk, then closed
    Stream(Vec<Bytes>),
    /// Streaming body that fails after the given chunks
    StreamThenError(Vec<Bytes>, HttpError),
    /// Streaming body that never closes after the given chunks
    StreamPending(Vec<Bytes>),
}

impl MockResponse {
    /// Buffered JSON response.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, value.to_string()))
    }

    /// Streaming body from string chunks.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|c| Bytes::from(c.into()))
                .collect(),
        )
    }
}

/// HTTP client answering from a table of `(method, url)` routes.
///
/// Clones share routes and recorded requests, so a test can keep a handle
/// after giving one to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    routes: Arc<Mutex<HashMap<(String, String), MockResponse>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a mock with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `GET url` with `response`.
    pub fn on_get(&self, url: &str, response: MockResponse) {
        self.route("GET", url, response);
    }

    /// Answer `POST url` (buffered or streaming) with `response`.
    pub fn on_post(&self, url: &str, response: MockResponse) {
        self.route("POST", url, response);
    }

    /// Answer unmatched requests with `response`.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests matching `method`, in order.
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    fn route(&self, method: &str, url: &str, response: MockResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_string(), url.to_string()), response);
    }

    fn record(&self, method: &str, url: &str, headers: &Headers, body: Option<&str>) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
    }

    fn lookup(&self, method: &str, url: &str) -> Result<MockResponse, HttpError> {
        let routes = self.routes.lock().unwrap();
        if let Some(response) = routes.get(&(method.to_string(), url.to_string())) {
            return Ok(response.clone());
        }
        self.default_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| HttpError::Other(format!("No mock response for {} {}", method, url)))
    }

    fn buffered(response: MockResponse) -> Result<Response, HttpError> {
        match response {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            _ => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record("GET", url, headers, None);
        Self::buffered(self.lookup("GET", url)?)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record("POST", url, headers, Some(body));
        Self::buffered(self.lookup("POST", url)?)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record("POST", url, headers, Some(body));

        match self.lookup("POST", url)? {
            MockResponse::Stream(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            MockResponse::StreamThenError(chunks, err) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::once(async move { Err(err) })),
            )),
            MockResponse::StreamPending(chunks) => Ok(Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()),
            )),
            MockResponse::Success(response) if !response.is_success() => Err(HttpError::Status {
                status: response.status,
                body: response.text_lossy(),
            }),
            MockResponse::Success(_) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            MockResponse::Error(err) => Err(err),
        }
    }
}
