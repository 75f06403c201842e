//! Data model for thread state and run input.

mod message;
mod request;
mod thread;
mod ui;
pub(crate) mod wire;

pub use message::{Message, MessageRole, RoleKey};
pub use request::{RunInput, RunRequest};
pub use thread::ThreadState;
pub use ui::{Props, UiElement, UiMetadata};
