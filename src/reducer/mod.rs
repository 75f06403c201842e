//! Folds [`StreamEvent`]s into a [`ThreadState`].
//!
//! The reducer mutates in place for efficiency; publication of an immutable
//! snapshot is the session's job. Reductions are split by entity kind:
//! `message.rs` for transcript chunks and `ui.rs` for widget upserts.
//!
//! Re-applying a chunk that carries new content appends it again. The
//! transport is expected to deliver each frame at most once.

mod message;
mod ui;

use crate::events::StreamEvent;
use crate::models::{ThreadState, UiElement};

/// What a single reduction changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// State was replaced wholesale.
    Replaced,
    /// A message was created or extended.
    Message { id: String, created: bool },
    /// A UI element was created or updated; carries the resulting record.
    Ui { element: UiElement, created: bool },
    /// Nothing changed.
    Ignored,
}

impl Applied {
    /// The created-or-updated UI element, if this was a UI reduction.
    pub fn ui_element(&self) -> Option<&UiElement> {
        match self {
            Applied::Ui { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn into_ui_element(self) -> Option<UiElement> {
        match self {
            Applied::Ui { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Applied::Ignored)
    }
}

impl ThreadState {
    /// Apply one event in place.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        match event {
            StreamEvent::ValuesReplace(state) => {
                *self = state;
                Applied::Replaced
            }
            StreamEvent::MessageChunk(chunk) => self.apply_message_chunk(chunk),
            StreamEvent::UiUpsert(update) => self.apply_ui_update(update),
            StreamEvent::Unknown { .. } => Applied::Ignored,
        }
    }
}

/// Pure form of [`ThreadState::apply`].
///
/// Returns the next state and, for UI upserts, the element as it now stands.
pub fn reduce(mut state: ThreadState, event: StreamEvent) -> (ThreadState, Option<UiElement>) {
    let applied = state.apply(event);
    (state, applied.into_ui_element())
}
