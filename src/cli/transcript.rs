//! Plain-text rendering of a thread for the terminal.

use std::fmt::Write;

use crate::models::{MessageRole, ThreadState, UiElement};

/// Render messages in order, each followed by the UI elements attached to
/// it. Elements with no (or an unknown) message come last.
pub fn render_transcript(state: &ThreadState) -> String {
    let mut out = String::new();

    for message in &state.messages {
        let speaker = match message.role {
            MessageRole::Human => "you",
            MessageRole::Agent => "agent",
        };
        let _ = writeln!(out, "{}: {}", speaker, message.content);
        for element in state.ui_for_message(&message.id) {
            let _ = writeln!(out, "  {}", render_element(element));
        }
    }

    let detached: Vec<_> = state
        .ui
        .iter()
        .filter(|u| match u.message_id() {
            Some(id) => state.message(id).is_none(),
            None => true,
        })
        .collect();
    if !detached.is_empty() {
        let _ = writeln!(out, "ui:");
        for element in detached {
            let _ = writeln!(out, "  {}", render_element(element));
        }
    }

    out
}

/// One-line form of a UI element: `[name] {props}`.
pub fn render_element(element: &UiElement) -> String {
    let name = if element.name.is_empty() {
        element.id.as_str()
    } else {
        element.name.as_str()
    };
    let done = if element.metadata.is_complete() { " (complete)" } else { "" };
    format!(
        "[{}]{} {}",
        name,
        done,
        serde_json::Value::Object(element.props.clone())
    )
}
