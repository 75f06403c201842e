//! Message reductions for ThreadState

use super::Applied;
use crate::models::{Message, ThreadState};

impl ThreadState {
    /// Append a chunk to the message with the same id, or start a new one.
    ///
    /// Content is only ever extended. The role of an existing message is
    /// never changed by later chunks.
    pub fn apply_message_chunk(&mut self, chunk: Message) -> Applied {
        match self.messages.iter_mut().find(|m| m.id == chunk.id) {
            Some(existing) => {
                existing.content.push_str(&chunk.content);
                Applied::Message {
                    id: chunk.id,
                    created: false,
                }
            }
            None => {
                let id = chunk.id.clone();
                self.messages.push(chunk);
                Applied::Message { id, created: true }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    #[test]
    fn test_chunks_concatenate() {
        let mut state = ThreadState::new();
        let chunks = ["Hel", "lo", "", ", ", "world"];
        for (i, chunk) in chunks.iter().enumerate() {
            let applied = state.apply_message_chunk(Message::agent("m1", *chunk));
            assert_eq!(
                applied,
                Applied::Message {
                    id: "m1".to_string(),
                    created: i == 0
                }
            );
        }
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, chunks.concat());
    }

    #[test]
    fn test_role_kept_from_first_chunk() {
        let mut state = ThreadState::new();
        state.apply_message_chunk(Message::new("h1", MessageRole::Human, "hi"));
        state.apply_message_chunk(Message::agent("h1", "!"));
        assert_eq!(state.messages[0].role, MessageRole::Human);
        assert_eq!(state.messages[0].content, "hi!");
    }

    #[test]
    fn test_interleaved_messages() {
        let mut state = ThreadState::new();
        state.apply_message_chunk(Message::agent("a", "A1"));
        state.apply_message_chunk(Message::agent("b", "B1"));
        state.apply_message_chunk(Message::agent("a", "A2"));
        assert_eq!(state.message("a").unwrap().content, "A1A2");
        assert_eq!(state.message("b").unwrap().content, "B1");
    }
}
