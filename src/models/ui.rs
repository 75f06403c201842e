use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::wire;

/// Open mapping of widget properties.
pub type Props = Map<String, Value>;

/// Producer-supplied metadata for a UI element.
///
/// Only the three fields the runtime reads are modelled; everything else is
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiMetadata {
    /// Shallow-merge this update's props onto the existing element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,

    /// Message this widget is attached to.
    #[serde(
        default,
        alias = "messageId",
        deserialize_with = "wire::opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<String>,

    /// Producer-declared finality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UiMetadata {
    pub fn is_merge(&self) -> bool {
        self.merge.unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.complete.unwrap_or(false)
    }
}

/// A typed widget emitted by the agent.
///
/// `name` and `props` are opaque to the runtime; only `id` and the merge flag
/// in `metadata` affect reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub metadata: UiMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UiElement {
    pub fn new(id: impl Into<String>, name: impl Into<String>, props: Props) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            props,
            metadata: UiMetadata::default(),
            extra: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: UiMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Message this element is attached to, if any.
    pub fn message_id(&self) -> Option<&str> {
        self.metadata.message_id.as_deref()
    }
}
