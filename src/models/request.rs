use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller input for one submission.
///
/// `context` carries arbitrary state the agent should condition on (e.g. a
/// working document). `command` carries imperative instructions such as
/// marking a widget accepted, as opposed to conversational input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
}

impl RunInput {
    /// Input carrying a human message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    /// Input carrying only a command.
    pub fn command(command: Value) -> Self {
        Self {
            command: Some(command),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_command(mut self, command: Value) -> Self {
        self.command = Some(command);
        self
    }

    /// The human message, if present and not blank.
    pub fn human_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Body of the stream-open request: the input fields sit beside `thread_id`.
#[derive(Debug, Serialize)]
pub struct RunRequest<'a> {
    pub thread_id: &'a str,
    #[serde(flatten)]
    pub input: &'a RunInput,
}

impl<'a> RunRequest<'a> {
    pub fn new(thread_id: &'a str, input: &'a RunInput) -> Self {
        Self { thread_id, input }
    }
}
