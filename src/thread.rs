//! Thread lifecycle: identity, restore, reset and snapshot publication.
//!
//! ```text
//! Unattached -> Restoring -> Attached <-> Streaming
//!                   ^           |
//!                   +-- Reset <-+
//! ```
//!
//! The manager owns the working [`ThreadState`]. Every change is published
//! through a `watch` channel as a new `Arc`, so subscribers can compare
//! snapshots by pointer and never observe a value being mutated.

use std::sync::Arc;

use tokio::sync::watch;

use crate::client::AgentClient;
use crate::error::{ErrorContext, ResultExt, WeftResult};
use crate::events::StreamEvent;
use crate::models::ThreadState;
use crate::reducer::Applied;
use crate::traits::KeyValueStore;

/// Store slot holding the current thread id.
pub const THREAD_ID_KEY: &str = "thread_id";
/// Store slot holding the bearer credential.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Where a thread is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadPhase {
    Unattached,
    /// Loading prior state from the service
    Restoring,
    Attached,
    /// A submission is consuming a run stream
    Streaming,
    /// Identity cleared; the next attach or submit starts a new thread
    Reset,
}

pub struct ThreadManager {
    client: AgentClient,
    store: Arc<dyn KeyValueStore>,
    eager_creation: bool,
    thread_id: Option<String>,
    phase: ThreadPhase,
    state: Arc<ThreadState>,
    publisher: watch::Sender<Arc<ThreadState>>,
}

impl std::fmt::Debug for ThreadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadManager")
            .field("thread_id", &self.thread_id)
            .field("phase", &self.phase)
            .field("messages", &self.state.messages.len())
            .field("ui", &self.state.ui.len())
            .finish()
    }
}

impl ThreadManager {
    pub fn new(client: AgentClient, store: Arc<dyn KeyValueStore>, eager_creation: bool) -> Self {
        let state = Arc::new(ThreadState::new());
        let (publisher, _) = watch::channel(state.clone());
        Self {
            client,
            store,
            eager_creation,
            thread_id: None,
            phase: ThreadPhase::Unattached,
            state,
            publisher,
        }
    }

    /// Resolve the thread identity and restore its prior state.
    ///
    /// A stored thread id is fetched; if the fetch fails for any reason the
    /// thread starts empty. Without a stored id a thread is created now when
    /// eager creation is on, otherwise on first submit.
    ///
    /// Fails only when the store cannot be read, or eager creation fails.
    pub async fn attach(&mut self) -> WeftResult<()> {
        self.phase = ThreadPhase::Restoring;

        let token = self
            .store
            .get(AUTH_TOKEN_KEY)
            .await
            .context(ErrorContext::new("attach"))?;
        self.client.set_auth_token(token);

        let stored = self
            .store
            .get(THREAD_ID_KEY)
            .await
            .context(ErrorContext::new("attach"))?
            .filter(|id| !id.trim().is_empty());

        let restored = match stored {
            Some(thread_id) => {
                let state = match self.client.fetch_thread(&thread_id).await {
                    Ok(state) => {
                        tracing::info!(
                            thread_id = %thread_id,
                            messages = state.messages.len(),
                            ui = state.ui.len(),
                            "Restored thread"
                        );
                        state
                    }
                    Err(e) => {
                        tracing::warn!(
                            thread_id = %thread_id,
                            error = %e,
                            "Could not restore thread, starting empty"
                        );
                        ThreadState::new()
                    }
                };
                self.thread_id = Some(thread_id);
                state
            }
            None => {
                self.thread_id = None;
                if self.eager_creation {
                    self.ensure_thread().await?;
                }
                ThreadState::new()
            }
        };

        self.replace_state(restored);
        self.phase = ThreadPhase::Attached;
        Ok(())
    }

    /// The current thread id, creating and persisting one if needed.
    pub async fn ensure_thread(&mut self) -> WeftResult<String> {
        if let Some(ref id) = self.thread_id {
            return Ok(id.clone());
        }

        let id = self
            .client
            .create_thread()
            .await
            .context(ErrorContext::new("create_thread"))?;
        self.store
            .set(THREAD_ID_KEY, Some(&id))
            .await
            .with_context(|| ErrorContext::new("persist_thread_id").with_thread_id(&id))?;

        self.thread_id = Some(id.clone());
        Ok(id)
    }

    /// Forget the thread: clear the stored id and publish an empty state.
    pub async fn reset(&mut self) -> WeftResult<()> {
        self.store
            .set(THREAD_ID_KEY, None)
            .await
            .context(ErrorContext::new("reset"))?;

        if let Some(id) = self.thread_id.take() {
            tracing::info!(thread_id = %id, "Thread reset");
        }
        self.replace_state(ThreadState::new());
        self.phase = ThreadPhase::Reset;
        Ok(())
    }

    /// Reduce one event into the working state and publish the result.
    ///
    /// Events that change nothing are not published.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        let applied = Arc::make_mut(&mut self.state).apply(event);
        if !applied.is_ignored() {
            self.publish();
        }
        applied
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ThreadState>> {
        self.publisher.subscribe()
    }

    /// The latest snapshot.
    pub fn state(&self) -> Arc<ThreadState> {
        self.state.clone()
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn phase(&self) -> ThreadPhase {
        self.phase
    }

    pub fn client(&self) -> &AgentClient {
        &self.client
    }

    pub(crate) fn set_phase(&mut self, phase: ThreadPhase) {
        self.phase = phase;
    }

    fn replace_state(&mut self, state: ThreadState) {
        self.state = Arc::new(state);
        self.publish();
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::adapters::InMemoryStore;
    use crate::error::ErrorCategory;
    use crate::models::Message;
    use serde_json::json;

    const BASE: &str = "http://agent.test";

    fn manager(mock: &MockHttpClient, store: &InMemoryStore, eager: bool) -> ThreadManager {
        let client = AgentClient::new(BASE, Arc::new(mock.clone()));
        ThreadManager::new(client, Arc::new(store.clone()), eager)
    }

    #[tokio::test]
    async fn test_attach_restores_stored_thread() {
        let mock = MockHttpClient::new();
        mock.on_get(
            &format!("{}/thread/t1", BASE),
            MockResponse::json(200, json!({"messages": [{"id": "m1", "type": "human", "content": "hi"}]})),
        );
        let store = InMemoryStore::with_entries([(THREAD_ID_KEY, "t1"), (AUTH_TOKEN_KEY, "tok")]);

        let mut threads = manager(&mock, &store, false);
        let rx = threads.subscribe();
        threads.attach().await.unwrap();

        assert_eq!(threads.phase(), ThreadPhase::Attached);
        assert_eq!(threads.thread_id(), Some("t1"));
        assert_eq!(rx.borrow().messages.len(), 1);
        assert_eq!(threads.client().auth_token(), Some("tok"));

        let fetch = &mock.requests()[0];
        assert_eq!(fetch.headers.get("Authorization"), Some(&"Bearer tok".to_string()));
    }

    #[tokio::test]
    async fn test_attach_fetch_failure_starts_empty() {
        let mock = MockHttpClient::new();
        mock.on_get(
            &format!("{}/thread/t1", BASE),
            MockResponse::json(404, json!({"detail": "missing"})),
        );
        let store = InMemoryStore::with_entries([(THREAD_ID_KEY, "t1")]);

        let mut threads = manager(&mock, &store, false);
        threads.attach().await.unwrap();

        assert!(threads.state().is_empty());
        assert_eq!(threads.thread_id(), Some("t1"));
        assert_eq!(threads.phase(), ThreadPhase::Attached);
    }

    #[tokio::test]
    async fn test_attach_lazy_does_not_create() {
        let mock = MockHttpClient::new();
        let store = InMemoryStore::new();

        let mut threads = manager(&mock, &store, false);
        threads.attach().await.unwrap();

        assert_eq!(threads.thread_id(), None);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_attach_eager_creates_and_persists() {
        let mock = MockHttpClient::new();
        mock.on_post(
            &format!("{}/threads", BASE),
            MockResponse::json(200, json!({"thread_id": "new-1"})),
        );
        let store = InMemoryStore::new();

        let mut threads = manager(&mock, &store, true);
        threads.attach().await.unwrap();

        assert_eq!(threads.thread_id(), Some("new-1"));
        assert_eq!(store.value(THREAD_ID_KEY).as_deref(), Some("new-1"));
    }

    #[tokio::test]
    async fn test_attach_store_failure() {
        let mock = MockHttpClient::new();
        let store = InMemoryStore::new();
        store.set_get_should_fail(true);

        let mut threads = manager(&mock, &store, false);
        let err = threads.attach().await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[tokio::test]
    async fn test_ensure_thread_reuses_id() {
        let mock = MockHttpClient::new();
        mock.on_post(
            &format!("{}/threads", BASE),
            MockResponse::json(200, json!({"id": "t9"})),
        );
        let store = InMemoryStore::new();
        let mut threads = manager(&mock, &store, false);

        assert_eq!(threads.ensure_thread().await.unwrap(), "t9");
        assert_eq!(threads.ensure_thread().await.unwrap(), "t9");
        assert_eq!(mock.requests_with_method("POST").len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_id_and_state() {
        let mock = MockHttpClient::new();
        let store = InMemoryStore::with_entries([(THREAD_ID_KEY, "t1")]);
        mock.on_get(
            &format!("{}/thread/t1", BASE),
            MockResponse::json(200, json!({"messages": [{"id": "m1", "type": "ai", "content": "x"}]})),
        );

        let mut threads = manager(&mock, &store, false);
        threads.attach().await.unwrap();
        let rx = threads.subscribe();

        threads.reset().await.unwrap();

        assert_eq!(threads.phase(), ThreadPhase::Reset);
        assert_eq!(threads.thread_id(), None);
        assert_eq!(store.value(THREAD_ID_KEY), None);
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_apply_publishes_fresh_snapshot() {
        let mock = MockHttpClient::new();
        let store = InMemoryStore::new();
        let mut threads = manager(&mock, &store, false);
        let mut rx = threads.subscribe();

        let before = threads.state();
        threads.apply(StreamEvent::MessageChunk(Message::agent("m1", "a")));
        assert!(rx.has_changed().unwrap());
        let after = rx.borrow_and_update().clone();

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.is_empty());
        assert_eq!(after.messages[0].content, "a");

        threads.apply(StreamEvent::Unknown {
            kind: None,
            raw: json!(null),
        });
        assert!(!rx.has_changed().unwrap());
    }
}
