//! Maps wire frames from every protocol era onto [`StreamEvent`].

use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::types::{PropsMode, StreamEvent, UiUpdate};
use crate::frame::Frame;
use crate::models::wire::WireId;
use crate::models::{Message, ThreadState, UiElement, UiMetadata};

/// Record `event` value that carries no meaning of its own.
const DEFAULT_EVENT: &str = "message";

/// Per-stream normalizer.
///
/// Legacy token events carry no message id, so the normalizer allocates one
/// per stream and files every legacy token and widget under it.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    legacy_message_id: String,
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventNormalizer {
    pub fn new() -> Self {
        Self::with_legacy_message_id(Uuid::new_v4().to_string())
    }

    pub fn with_legacy_message_id(id: impl Into<String>) -> Self {
        Self {
            legacy_message_id: id.into(),
        }
    }

    pub fn legacy_message_id(&self) -> &str {
        &self.legacy_message_id
    }

    /// Classify one frame.
    ///
    /// The discriminant is the record's `event` field when present, else the
    /// payload's `type` field. Every frame yields exactly one event;
    /// unrecognised or unusable payloads become [`StreamEvent::Unknown`].
    pub fn normalize(&self, frame: Frame) -> StreamEvent {
        let kind = match frame.event.as_deref() {
            Some(event) if event != DEFAULT_EVENT => Some(event.to_string()),
            _ => frame.data_type().map(str::to_string),
        };
        let raw = frame.data.unwrap_or(Value::Null);

        let event = kind
            .as_deref()
            .and_then(|kind| self.classify(kind, &raw));

        match event {
            Some(event) => event,
            None => {
                if kind.as_deref() == Some("error") {
                    tracing::warn!(payload = %raw, "Agent service reported an error event");
                } else {
                    tracing::debug!(kind = ?kind, "Unrecognised stream event");
                }
                StreamEvent::Unknown { kind, raw }
            }
        }
    }

    fn classify(&self, kind: &str, raw: &Value) -> Option<StreamEvent> {
        match kind {
            "values" => ThreadState::from_payload(raw.clone())
                .ok()
                .map(StreamEvent::ValuesReplace),
            "messages" | "messages/partial" | "messages/complete" => {
                let chunk = match raw {
                    Value::Array(items) => items.first()?,
                    other => other,
                };
                message_chunk(chunk)
            }
            "custom" => match raw.get("type").and_then(Value::as_str) {
                Some("ui") => ui_upsert(raw),
                _ => None,
            },
            "ui" | "UIMessage" | "UIMessageChunk" => ui_upsert(raw),
            "UIPropMessageChunk" => prop_append(raw),
            "stream" => Some(StreamEvent::MessageChunk(Message::agent(
                self.legacy_message_id.clone(),
                legacy_text(raw),
            ))),
            "thinking" => Some(self.legacy_thinking(raw)),
            "question" | "tool" => Some(self.legacy_widget(kind, raw)),
            k if is_message_kind(k) => message_chunk(raw),
            _ => None,
        }
    }

    fn legacy_metadata(&self) -> UiMetadata {
        UiMetadata {
            message_id: Some(self.legacy_message_id.clone()),
            ..UiMetadata::default()
        }
    }

    fn legacy_thinking(&self, raw: &Value) -> StreamEvent {
        let mut props = Map::new();
        props.insert("content".to_string(), Value::String(legacy_text(raw)));
        StreamEvent::UiUpsert(UiUpdate {
            id: format!("thinking-{}", self.legacy_message_id),
            name: Some("thinking".to_string()),
            props,
            metadata: self.legacy_metadata(),
            mode: PropsMode::Append,
        })
    }

    fn legacy_widget(&self, kind: &str, raw: &Value) -> StreamEvent {
        let id = raw
            .get("id")
            .and_then(|id| WireId::deserialize(id).ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let props = match raw.get("content") {
            Some(Value::Object(map)) => map.clone(),
            _ => {
                let mut props = Map::new();
                props.insert("content".to_string(), Value::String(legacy_text(raw)));
                props
            }
        };

        StreamEvent::UiUpsert(UiUpdate {
            id,
            name: Some(kind.to_string()),
            props,
            metadata: self.legacy_metadata(),
            mode: PropsMode::Replace,
        })
    }
}

fn is_message_kind(kind: &str) -> bool {
    matches!(
        kind,
        "AIMessageChunk"
            | "AIMessage"
            | "ai"
            | "assistant"
            | "HumanMessageChunk"
            | "HumanMessage"
            | "human"
            | "user"
    )
}

fn message_chunk(raw: &Value) -> Option<StreamEvent> {
    if !raw.is_object() {
        return None;
    }
    Message::deserialize(raw).ok().map(StreamEvent::MessageChunk)
}

fn ui_upsert(raw: &Value) -> Option<StreamEvent> {
    let element = UiElement::deserialize(raw).ok()?;
    let name_present = raw.get("name").is_some_and(|n| !n.is_null());
    Some(StreamEvent::UiUpsert(UiUpdate::from_element(
        element,
        name_present,
    )))
}

fn prop_append(raw: &Value) -> Option<StreamEvent> {
    let id = String::from(WireId::deserialize(raw.get("id")?).ok()?);
    let prop = raw.get("prop")?.as_str()?.to_string();
    let value = match raw.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let mut props = Map::new();
    props.insert(prop, Value::String(value));
    Some(StreamEvent::UiUpsert(UiUpdate {
        id,
        name: None,
        props,
        metadata: UiMetadata::default(),
        mode: PropsMode::Append,
    }))
}

/// Text of a legacy event: `content`, falling back to `token`.
fn legacy_text(raw: &Value) -> String {
    ["content", "token"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
