use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::Message;
use super::ui::UiElement;

/// Reconciled snapshot of one conversation thread.
///
/// `messages` and `ui` are ordered by the first event that introduced each
/// id. Fields the runtime does not model (shared agent state such as a
/// working document) are kept in `extra` and round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub ui: Vec<UiElement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a full-state payload.
    ///
    /// Accepts the bare state object or a wrapper holding it under `values`,
    /// which is how the thread endpoint and the bare-line `values` event
    /// deliver it.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        match payload {
            Value::Object(mut map) if map.get("values").is_some_and(Value::is_object) => {
                let inner = map.remove("values").unwrap_or_default();
                serde_json::from_value(inner)
            }
            other => serde_json::from_value(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.ui.is_empty() && self.extra.is_empty()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn ui_element(&self, id: &str) -> Option<&UiElement> {
        self.ui.iter().find(|u| u.id == id)
    }

    /// UI elements attached to message `id`, in insertion order.
    pub fn ui_for_message<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a UiElement> + 'a {
        self.ui.iter().filter(move |u| u.message_id() == Some(id))
    }
}
