//! Wire framing for the agent event stream.
//!
//! The response body is either newline-delimited JSON or `field: value`
//! records terminated by a blank line, depending on the deployment. One
//! decoder handles both, line by line.

mod decoder;
mod line;
mod stream;

use std::collections::BTreeMap;

use serde_json::Value;

pub use decoder::{FrameDecoder, FrameResult};
pub use line::{parse_frame_line, FrameLine};
pub use stream::{decode_frames, FrameStream};

/// Which delimiter style produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    /// One JSON value on a single line.
    JsonLine,
    /// `field: value` lines closed by a blank line.
    Record,
}

/// One complete wire frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub style: FrameStyle,
    /// `event` field of a record. Always `None` for JSON lines.
    pub event: Option<String>,
    /// Decoded `data` of a record, or the whole value of a JSON line.
    pub data: Option<Value>,
    /// Other record fields (`id`, `retry`, ...) as plain strings.
    pub fields: BTreeMap<String, String>,
}

impl Frame {
    pub fn json_line(value: Value) -> Self {
        Self {
            style: FrameStyle::JsonLine,
            event: None,
            data: Some(value),
            fields: BTreeMap::new(),
        }
    }

    pub fn record(event: impl Into<String>, data: Value) -> Self {
        Self {
            style: FrameStyle::Record,
            event: Some(event.into()),
            data: Some(data),
            fields: BTreeMap::new(),
        }
    }

    /// `type` field of an object payload.
    pub fn data_type(&self) -> Option<&str> {
        self.data.as_ref()?.get("type")?.as_str()
    }
}
