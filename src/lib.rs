//! weft - client runtime for streaming conversational-agent services
//!
//! Decodes a run's event stream, normalizes every wire shape into one event
//! type, and reconciles the events into a [`models::ThreadState`] snapshot
//! of messages and agent-emitted UI widgets.
//!
//! ```ignore
//! use tokio_util::sync::CancellationToken;
//! use weft::{config::ClientConfig, models::RunInput, session::Session};
//!
//! let mut session = Session::from_config(&ClientConfig::from_env());
//! session.attach().await?;
//! let mut snapshots = session.subscribe();
//! session.submit(RunInput::message("hi"), &CancellationToken::new()).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod models;
pub mod reducer;
pub mod session;
pub mod thread;
pub mod traits;
