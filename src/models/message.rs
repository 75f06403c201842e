use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::wire;

/// Who authored a message.
///
/// Serializes as the short LangChain kind (`human` / `ai`). Deserialization
/// accepts every spelling the agent service has used for either side; any
/// kind that is not recognisably human is treated as agent output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageRole {
    #[serde(rename = "human")]
    Human,
    #[serde(rename = "ai")]
    Agent,
}

impl MessageRole {
    /// Classify a wire role or message kind.
    pub fn from_wire(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "human" | "user" | "humanmessage" | "humanmessagechunk" => MessageRole::Human,
            _ => MessageRole::Agent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::Human => "human",
            MessageRole::Agent => "ai",
        }
    }
}

impl<'de> Deserialize<'de> for MessageRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(MessageRole::from_wire(&kind))
    }
}

/// Which field carried the role on the wire.
///
/// LangChain payloads use `type`; the canonical snapshot shape uses `role`.
/// A message is written back under the key it was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleKey {
    #[default]
    Type,
    Role,
}

/// One transcript entry.
///
/// `content` only ever grows once the message exists; streaming chunks for
/// the same `id` are appended by the reducer. Fields the runtime does not
/// model (`additional_kwargs`, `response_metadata`, ...) are kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "WireMessage")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub extra: Map<String, Value>,
    pub role_key: RoleKey,
}

// The role key is a serialization detail and does not take part in equality.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.role == other.role
            && self.content == other.content
            && self.extra == other.extra
    }
}

impl Serialize for Message {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (role, kind) = match self.role_key {
            RoleKey::Role => (Some(self.role), None),
            RoleKey::Type => (None, Some(self.role)),
        };
        MessageOut {
            id: &self.id,
            role,
            kind,
            content: &self.content,
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct MessageOut<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<MessageRole>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<MessageRole>,
    content: &'a str,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            extra: Map::new(),
            role_key: RoleKey::default(),
        }
    }

    /// Human message with a locally assigned id.
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), MessageRole::Human, content)
    }

    /// Agent message (or chunk) carrying a producer-assigned id.
    pub fn agent(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Agent, content)
    }

    pub fn with_role_key(mut self, key: RoleKey) -> Self {
        self.role_key = key;
        self
    }
}

/// Message shape as it appears on the wire.
#[derive(Deserialize)]
struct WireMessage {
    #[serde(default, deserialize_with = "wire::opt_id")]
    id: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Message content: a plain string or a list of content blocks.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePart {
    Text(String),
    Block {
        #[serde(default, rename = "type")]
        kind: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    Other(serde_json::Value),
}

impl WireContent {
    fn into_text(self) -> String {
        match self {
            WireContent::Text(text) => text,
            WireContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    WirePart::Text(text) => Some(text),
                    WirePart::Block { kind, text } => match kind.as_deref() {
                        None | Some("text") => text,
                        Some(_) => None,
                    },
                    WirePart::Other(_) => None,
                })
                .collect(),
            WireContent::Other(value) => value
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let mut extra = wire.extra;
        let (role, role_key) = match (wire.role, wire.kind) {
            (Some(role), kind) => {
                if let Some(kind) = kind {
                    extra.insert("type".to_string(), Value::String(kind));
                }
                (MessageRole::from_wire(&role), RoleKey::Role)
            }
            (None, Some(kind)) => (MessageRole::from_wire(&kind), RoleKey::Type),
            (None, None) => (MessageRole::Agent, RoleKey::Type),
        };

        Message {
            id: wire.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            role,
            content: wire.content.map(WireContent::into_text).unwrap_or_default(),
            extra,
            role_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_spellings() {
        for kind in ["human", "user", "HumanMessage", "HumanMessageChunk"] {
            assert_eq!(MessageRole::from_wire(kind), MessageRole::Human, "{kind}");
        }
        for kind in ["ai", "assistant", "AIMessage", "AIMessageChunk", "agent"] {
            assert_eq!(MessageRole::from_wire(kind), MessageRole::Agent, "{kind}");
        }
    }

    #[test]
    fn test_deserialize_backend_shape() {
        let msg: Message =
            serde_json::from_value(json!({"id": "m1", "type": "AIMessageChunk", "content": "Hel"}))
                .unwrap();
        assert_eq!(msg, Message::agent("m1", "Hel"));
    }

    #[test]
    fn test_deserialize_role_field_and_numeric_id() {
        let msg: Message =
            serde_json::from_value(json!({"id": 17, "role": "user", "content": "hi"})).unwrap();
        assert_eq!(msg.id, "17");
        assert_eq!(msg.role, MessageRole::Human);
    }

    #[test]
    fn test_content_blocks_concatenated() {
        let msg: Message = serde_json::from_value(json!({
            "id": "m2",
            "type": "ai",
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "tool_use", "id": "x", "input": {}},
                {"type": "text", "text": ", world"}
            ]
        }))
        .unwrap();
        assert_eq!(msg.content, "Hello, world");
    }

    #[test]
    fn test_null_content_is_empty() {
        let msg: Message =
            serde_json::from_value(json!({"id": "m3", "type": "ai", "content": null})).unwrap();
        assert_eq!(msg.content, "");
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let msg: Message = serde_json::from_value(json!({"type": "ai", "content": "x"})).unwrap();
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_serialize_canonical_shape() {
        let value = serde_json::to_value(Message::human("hi")).unwrap();
        assert_eq!(value["type"], "human");
        assert_eq!(value["content"], "hi");
    }

    #[test]
    fn test_role_key_and_extra_fields_round_trip() {
        let raw = json!({
            "id": "m1",
            "role": "ai",
            "content": "x",
            "additional_kwargs": {},
            "response_metadata": {"model": "gpt"}
        });
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.role_key, RoleKey::Role);
        assert_eq!(msg.extra.get("response_metadata"), Some(&json!({"model": "gpt"})));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_type_key_written_back_as_type() {
        let raw = json!({"id": "m2", "type": "human", "content": "hi", "name": null});
        let msg: Message = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.role_key, RoleKey::Type);
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_role_wins_over_type_and_type_is_kept() {
        let msg: Message = serde_json::from_value(
            json!({"id": "m3", "role": "user", "type": "HumanMessage", "content": "q"}),
        )
        .unwrap();
        assert_eq!(msg.role, MessageRole::Human);
        assert_eq!(msg.extra.get("type"), Some(&json!("HumanMessage")));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "human");
        assert_eq!(value["type"], "HumanMessage");
    }

    #[test]
    fn test_role_key_ignored_by_equality() {
        let msg = Message::agent("m4", "x").with_role_key(RoleKey::Role);
        assert_eq!(msg, Message::agent("m4", "x"));
    }
}
