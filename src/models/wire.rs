//! Lenient wire shapes shared by the model types.

use serde::{Deserialize, Deserializer};

/// Identifier that may arrive as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// `deserialize_with` helper for required ids.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(String::from)
}

/// `deserialize_with` helper for optional ids.
pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireId>::deserialize(deserializer).map(|id| id.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "id")]
        id: String,
        #[serde(default, deserialize_with = "opt_id")]
        parent: Option<String>,
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let h: Holder = serde_json::from_str(r#"{"id": 1718000000123, "parent": "m1"}"#).unwrap();
        assert_eq!(h.id, "1718000000123");
        assert_eq!(h.parent.as_deref(), Some("m1"));
    }

    #[test]
    fn test_missing_optional_id() {
        let h: Holder = serde_json::from_str(r#"{"id": "a"}"#).unwrap();
        assert_eq!(h.parent, None);
    }
}
