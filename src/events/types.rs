use serde_json::Value;

use crate::models::{Message, Props, ThreadState, UiElement, UiMetadata};

/// How an update's props combine with an existing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropsMode {
    /// Replace the whole element, keeping only its id.
    Replace,
    /// Shallow-merge props on top of the existing ones.
    Merge,
    /// Append each string prop onto the existing value of the same key.
    Append,
}

/// A create-or-update for one UI element.
#[derive(Debug, Clone, PartialEq)]
pub struct UiUpdate {
    pub id: String,
    /// Widget kind. Absent on partial updates that only touch props.
    pub name: Option<String>,
    pub props: Props,
    pub metadata: UiMetadata,
    pub mode: PropsMode,
}

impl UiUpdate {
    /// Update carrying a full element; the mode comes from `metadata.merge`.
    pub fn from_element(element: UiElement, name_present: bool) -> Self {
        let mode = if element.metadata.is_merge() {
            PropsMode::Merge
        } else {
            PropsMode::Replace
        };
        Self {
            id: element.id,
            name: name_present.then_some(element.name),
            props: element.props,
            metadata: element.metadata,
            mode,
        }
    }

    /// Element to insert when no element with this id exists yet.
    pub fn into_element(self) -> UiElement {
        UiElement::new(self.id, self.name.unwrap_or_default(), self.props)
            .with_metadata(self.metadata)
    }
}

/// Canonical event consumed by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Authoritative snapshot replacing the whole state.
    ValuesReplace(ThreadState),
    /// Incremental content for one message.
    MessageChunk(Message),
    /// Create or update one UI element.
    UiUpsert(UiUpdate),
    /// Anything not recognised. Carries the frame's discriminant and payload.
    Unknown {
        kind: Option<String>,
        raw: Value,
    },
}

impl StreamEvent {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            StreamEvent::ValuesReplace(_) => "values",
            StreamEvent::MessageChunk(_) => "message",
            StreamEvent::UiUpsert(_) => "ui",
            StreamEvent::Unknown { .. } => "unknown",
        }
    }
}
