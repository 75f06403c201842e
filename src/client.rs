//! Agent service API client.
//!
//! Three endpoints are used:
//!
//! - `GET  {base}/thread/{id}`         last persisted state of a thread
//! - `POST {base}/threads`             allocate a thread id
//! - `POST {base}/thread/{id}/stream`  run the agent, streaming events back

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::adapters::ReqwestHttpClient;
use crate::error::{NetworkError, WeftResult};
use crate::frame::{decode_frames, FrameStream};
use crate::models::wire::WireId;
use crate::models::{RunInput, RunRequest, ThreadState};
use crate::traits::{Headers, HttpClient, Response};

/// Default agent service address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the agent service.
#[derive(Clone)]
pub struct AgentClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
    auth_token: Option<String>,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

impl AgentClient {
    /// Client for `base_url` over the given transport.
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            auth_token: None,
        }
    }

    /// Client for `base_url` over a default reqwest transport.
    pub fn with_url(base_url: &str) -> Self {
        Self::new(base_url, Arc::new(ReqwestHttpClient::new()))
    }

    /// Set the bearer credential sent with every request.
    pub fn with_auth(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self, accept: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), accept.to_string());
        if let Some(ref token) = self.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    fn check_status(response: &Response) -> Result<(), NetworkError> {
        if response.is_success() {
            Ok(())
        } else {
            Err(NetworkError::HttpStatus {
                status: response.status,
                message: response.text_lossy(),
            })
        }
    }

    /// Fetch the persisted state of `thread_id`.
    ///
    /// The response may be the state itself or a wrapper with the state
    /// under `values`.
    pub async fn fetch_thread(&self, thread_id: &str) -> WeftResult<ThreadState> {
        let url = self.url(&format!("/thread/{}", thread_id));
        let response = self
            .http
            .get(&url, &self.headers("application/json"))
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check_status(&response)?;

        let payload: Value = response.json()?;
        Ok(ThreadState::from_payload(payload)?)
    }

    /// Ask the service for a new thread id.
    ///
    /// Accepts `{"thread_id": ..}`, `{"id": ..}` or a bare JSON string.
    pub async fn create_thread(&self) -> WeftResult<String> {
        let url = self.url("/threads");
        let response = self
            .http
            .post(&url, "{}", &self.headers("application/json"))
            .await
            .map_err(|e| NetworkError::from_http(e, &url))?;
        Self::check_status(&response)?;

        let payload: Value = response.json()?;
        let id = match &payload {
            Value::String(id) => Some(id.clone()),
            Value::Object(map) => map
                .get("thread_id")
                .or_else(|| map.get("id"))
                .and_then(|id| serde::Deserialize::deserialize(id).ok())
                .map(|id: WireId| String::from(id)),
            _ => None,
        };

        let id = id.filter(|id| !id.is_empty()).ok_or_else(|| NetworkError::InvalidResponse {
            message: format!("no thread id in create response: {}", payload),
        })?;
        tracing::info!(thread_id = %id, "Created thread");
        Ok(id)
    }

    /// Start a run on `thread_id` and return its frames.
    ///
    /// Resolves once response headers arrive. Cancelling `cancel` before
    /// then abandons the request.
    pub async fn stream_run(
        &self,
        thread_id: &str,
        input: &RunInput,
        cancel: &CancellationToken,
    ) -> WeftResult<FrameStream> {
        let url = self.url(&format!("/thread/{}/stream", thread_id));
        let body = serde_json::to_string(&RunRequest::new(thread_id, input))?;
        let headers = self.headers("text/event-stream, application/x-ndjson");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(NetworkError::Cancelled.into()),
            result = self.http.post_stream(&url, &body, &headers) => result,
        };
        let body = opened.map_err(|e| NetworkError::from_http(e, &url))?;

        tracing::debug!(thread_id, "Run stream opened");
        Ok(decode_frames(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::{ErrorCategory, WeftError};
    use futures_util::StreamExt;
    use serde_json::json;

    const BASE: &str = "http://agent.test";

    fn client(mock: &MockHttpClient) -> AgentClient {
        AgentClient::new(BASE, Arc::new(mock.clone()))
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let c = AgentClient::with_url("http://localhost:8000/");
        assert_eq!(c.base_url(), "http://localhost:8000");
        assert_eq!(c.url("/threads"), "http://localhost:8000/threads");
    }

    #[test]
    fn test_auth_header() {
        let c = AgentClient::with_url(BASE).with_auth("tok");
        assert_eq!(
            c.headers("application/json").get("Authorization"),
            Some(&"Bearer tok".to_string())
        );
        assert!(AgentClient::with_url(BASE)
            .headers("application/json")
            .get("Authorization")
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_thread_wrapped() {
        let mock = MockHttpClient::new();
        mock.on_get(
            &format!("{}/thread/t1", BASE),
            MockResponse::json(200, json!({"values": {"messages": [{"id": "m1", "type": "ai", "content": "x"}]}})),
        );

        let state = client(&mock).fetch_thread("t1").await.unwrap();
        assert_eq!(state.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_thread_not_found() {
        let mock = MockHttpClient::new();
        mock.on_get(
            &format!("{}/thread/t1", BASE),
            MockResponse::json(404, json!({"detail": "Not Found"})),
        );

        let err = client(&mock).fetch_thread("t1").await.unwrap_err();
        match err {
            WeftError::Network(ref net) => assert!(net.is_not_found()),
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_thread_shapes() {
        for (body, expected) in [
            (json!({"thread_id": "t-1"}), "t-1"),
            (json!({"id": 42}), "42"),
            (json!("t-3"), "t-3"),
        ] {
            let mock = MockHttpClient::new();
            mock.on_post(&format!("{}/threads", BASE), MockResponse::json(200, body));
            assert_eq!(client(&mock).create_thread().await.unwrap(), expected);

            let requests = mock.requests();
            assert_eq!(requests[0].body.as_deref(), Some("{}"));
        }
    }

    #[tokio::test]
    async fn test_create_thread_without_id() {
        let mock = MockHttpClient::new();
        mock.on_post(&format!("{}/threads", BASE), MockResponse::json(200, json!({})));
        let err = client(&mock).create_thread().await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Protocol);
    }

    #[tokio::test]
    async fn test_stream_run_posts_input() {
        let mock = MockHttpClient::new();
        mock.on_post(
            &format!("{}/thread/t1/stream", BASE),
            MockResponse::chunks(["{\"id\":\"m1\",\"type\":\"AIMessageChunk\",\"content\":\"a\"}\n"]),
        );

        let c = client(&mock).with_auth("tok");
        let frames: Vec<_> = c
            .stream_run("t1", &RunInput::message("hi"), &CancellationToken::new())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(frames.len(), 1);

        let request = &mock.requests()[0];
        assert_eq!(
            request.json_body(),
            Some(json!({"thread_id": "t1", "message": "hi"}))
        );
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer tok".to_string())
        );
    }

    #[tokio::test]
    async fn test_stream_run_cancelled_before_open() {
        let mock = MockHttpClient::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client(&mock)
            .stream_run("t1", &RunInput::message("hi"), &cancel)
            .await
            .err().unwrap();
        assert!(err.is_cancelled());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_stream_run_error_status() {
        let mock = MockHttpClient::new();
        mock.on_post(
            &format!("{}/thread/t1/stream", BASE),
            MockResponse::Success(Response::new(500, "boom")),
        );

        let err = client(&mock)
            .stream_run("t1", &RunInput::message("hi"), &CancellationToken::new())
            .await
            .err().unwrap();
        assert_eq!(err.category(), ErrorCategory::Server);
    }
}
