//! Submission orchestration.
//!
//! A [`Session`] owns one [`ThreadManager`] and drives each submission
//! through decode, normalize and reduce, publishing a snapshot after every
//! change. Submissions take `&mut self` and so never overlap on a session;
//! share one across tasks behind a `tokio::sync::Mutex` to queue them.

use std::fmt;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::adapters::{FileKeyValueStore, ReqwestHttpClient};
use crate::client::AgentClient;
use crate::config::ClientConfig;
use crate::error::{ErrorContext, NetworkError, ResultExt, WeftError, WeftResult};
use crate::events::{EventNormalizer, StreamEvent};
use crate::models::{Message, RunInput, ThreadState, UiElement};
use crate::thread::{ThreadManager, ThreadPhase};
use crate::traits::{HttpClient, KeyValueStore};

pub type HumanMessageHook = Box<dyn Fn(&Message) + Send + Sync>;
pub type UiEventHook = Box<dyn Fn(&UiElement) + Send + Sync>;

/// Optional callbacks fired during a submission.
#[derive(Default)]
pub struct SessionHooks {
    on_new_human_message: Option<HumanMessageHook>,
    on_ui_event: Option<UiEventHook>,
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_new_human_message", &self.on_new_human_message.is_some())
            .field("on_ui_event", &self.on_ui_event.is_some())
            .finish()
    }
}

impl SessionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the optimistic human message is in the published state.
    pub fn on_new_human_message(mut self, hook: impl Fn(&Message) + Send + Sync + 'static) -> Self {
        self.on_new_human_message = Some(Box::new(hook));
        self
    }

    /// Called with each UI element as it stands after being created or updated.
    pub fn on_ui_event(mut self, hook: impl Fn(&UiElement) + Send + Sync + 'static) -> Self {
        self.on_ui_event = Some(Box::new(hook));
        self
    }
}

/// Counters for one submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitSummary {
    /// Frames decoded successfully
    pub frames: usize,
    /// Events that changed state
    pub applied: usize,
    /// Frames dropped because their payload could not be decoded
    pub decode_faults: usize,
    /// Frames with an unrecognised discriminant
    pub unknown: usize,
}

#[derive(Debug)]
pub struct Session {
    threads: ThreadManager,
    hooks: SessionHooks,
}

impl Session {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<dyn KeyValueStore>,
        config: &ClientConfig,
    ) -> Self {
        let client = AgentClient::new(&config.base_url, http);
        Self {
            threads: ThreadManager::new(client, store, config.eager_thread_creation),
            hooks: SessionHooks::default(),
        }
    }

    /// Session over reqwest and a file store in `config.data_dir`.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut http = ReqwestHttpClient::new();
        if let Some(timeout) = config.request_timeout {
            http = http.with_request_timeout(timeout);
        }
        let store = FileKeyValueStore::in_dir(&config.data_dir);
        Self::new(Arc::new(http), Arc::new(store), config)
    }

    pub fn with_hooks(mut self, hooks: SessionHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Resolve the thread and restore its state. See [`ThreadManager::attach`].
    pub async fn attach(&mut self) -> WeftResult<()> {
        self.threads.attach().await
    }

    /// Clear the thread identity and publish an empty state.
    pub async fn reset(&mut self) -> WeftResult<()> {
        self.threads.reset().await
    }

    /// Run the agent on `input` and fold its stream into the thread state.
    ///
    /// A human message in `input` is added to the state before any network
    /// activity. Frames whose payload cannot be decoded are skipped and
    /// counted. The call fails when the thread cannot be created, the stream
    /// cannot be opened, the connection drops, or `cancel` fires; state
    /// published up to that point is kept.
    pub async fn submit(
        &mut self,
        input: RunInput,
        cancel: &CancellationToken,
    ) -> WeftResult<SubmitSummary> {
        if let Some(text) = input.human_text() {
            let message = Message::human(text);
            self.threads.apply(StreamEvent::MessageChunk(message.clone()));
            if let Some(ref hook) = self.hooks.on_new_human_message {
                hook(&message);
            }
        }

        let thread_id = self.threads.ensure_thread().await?;

        self.threads.set_phase(ThreadPhase::Streaming);
        let result = self.consume_run(&thread_id, &input, cancel).await;
        self.threads.set_phase(ThreadPhase::Attached);

        match result {
            Ok(summary) => {
                tracing::info!(
                    thread_id = %thread_id,
                    frames = summary.frames,
                    applied = summary.applied,
                    decode_faults = summary.decode_faults,
                    "Run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::info!(thread_id = %thread_id, "Run cancelled");
                } else {
                    let context = e.context().map(|c| c.to_log_string()).unwrap_or_default();
                    tracing::warn!(
                        thread_id = %thread_id,
                        error = %e,
                        code = e.error_code(),
                        context = %context,
                        "Run failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn consume_run(
        &mut self,
        thread_id: &str,
        input: &RunInput,
        cancel: &CancellationToken,
    ) -> WeftResult<SubmitSummary> {
        let context = || ErrorContext::new("submit").with_thread_id(thread_id);

        let mut frames = self
            .threads
            .client()
            .stream_run(thread_id, input, cancel)
            .await
            .with_context(context)?;

        let normalizer = EventNormalizer::new();
        let mut summary = SubmitSummary::default();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(WeftError::from(NetworkError::Cancelled).with_context(context()));
                }
                next = frames.next() => next,
            };
            let Some(decoded) = next else {
                break;
            };

            let frame = match decoded {
                Ok(frame) => frame,
                Err(e) if e.is_frame_local() => {
                    tracing::warn!(thread_id, error = %e, "Skipping undecodable frame");
                    summary.decode_faults += 1;
                    continue;
                }
                Err(e) => return Err(WeftError::from(e).with_context(context())),
            };
            summary.frames += 1;

            let event = normalizer.normalize(frame);
            tracing::trace!(thread_id, event = event.label(), "Applying event");
            if matches!(event, StreamEvent::Unknown { .. }) {
                summary.unknown += 1;
            }

            let applied = self.threads.apply(event);
            if applied.is_ignored() {
                continue;
            }
            summary.applied += 1;

            if let (Some(element), Some(hook)) = (applied.ui_element(), self.hooks.on_ui_event.as_ref()) {
                hook(element);
            }
        }

        Ok(summary)
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ThreadState>> {
        self.threads.subscribe()
    }

    pub fn state(&self) -> Arc<ThreadState> {
        self.threads.state()
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.threads.thread_id()
    }

    pub fn phase(&self) -> ThreadPhase {
        self.threads.phase()
    }

    pub fn threads(&self) -> &ThreadManager {
        &self.threads
    }
}
