//! Canonical stream events and the normalizer that produces them.
//!
//! Recognised wire shapes, all folded into [`StreamEvent`]:
//!
//! | Discriminant                              | Event          |
//! |-------------------------------------------|----------------|
//! | `values`                                  | ValuesReplace  |
//! | `messages`, `AIMessageChunk`, `human`, .. | MessageChunk   |
//! | `custom` + `type: ui`, `UIMessageChunk`   | UiUpsert       |
//! | `UIPropMessageChunk`                      | UiUpsert (append) |
//! | `stream`                                  | MessageChunk (legacy id) |
//! | `thinking`, `question`, `tool`            | UiUpsert (legacy) |
//! | anything else                             | Unknown        |

mod normalize;
mod types;

pub use normalize::EventNormalizer;
pub use types::{PropsMode, StreamEvent, UiUpdate};
