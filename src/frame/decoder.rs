//! Stateful frame decoder.

use std::collections::BTreeMap;

use serde_json::Value;

use super::line::{parse_frame_line, FrameLine};
use super::{Frame, FrameStyle};
use crate::error::StreamError;

/// Outcome of decoding one frame.
pub type FrameResult = Result<Frame, StreamError>;

/// Field lines collected since the last blank line.
#[derive(Debug, Default)]
struct PendingRecord {
    event: Option<String>,
    data: Vec<String>,
    fields: BTreeMap<String, String>,
    started: bool,
}

impl PendingRecord {
    fn push(&mut self, name: &str, value: &str) {
        self.started = true;
        match name {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {
                self.fields.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn take(&mut self) -> Option<PendingRecord> {
        if self.started {
            Some(std::mem::take(self))
        } else {
            None
        }
    }

    fn into_frame(self) -> FrameResult {
        let joined = self.data.join("\n");
        let data = if joined.trim().is_empty() {
            None
        } else {
            Some(parse_json(&joined)?)
        };
        Ok(Frame {
            style: FrameStyle::Record,
            event: self.event,
            data,
            fields: self.fields,
        })
    }
}

fn parse_json(text: &str) -> Result<Value, StreamError> {
    serde_json::from_str(text).map_err(|e| StreamError::invalid_json(text, &e))
}

/// Turns body chunks into frames.
///
/// Chunk boundaries are arbitrary: bytes after the last newline are carried
/// over to the next [`feed`](Self::feed). Each line is classified on its own,
/// so one body may mix bare JSON lines and `field: value` records. A bare
/// JSON line closes any record still pending so the two styles never share
/// a frame.
///
/// A malformed frame yields an `Err` item in place of that frame only.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    record: PendingRecord,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every frame it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<FrameResult> {
        let mut out = Vec::new();
        let mut buffer = std::mem::take(&mut self.buffer);

        // Carried-over bytes contain no newline, so only scan the new ones.
        let mut search_from = buffer.len();
        buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(pos) = buffer[search_from..].iter().position(|&b| b == b'\n') {
            let end = search_from + pos;
            self.process_line(&buffer[start..end], &mut out);
            start = end + 1;
            search_from = start;
        }

        buffer.drain(..start);
        self.buffer = buffer;
        out
    }

    /// Flush at end of stream.
    ///
    /// A complete frame still waiting for its terminator is emitted. A
    /// trailing fragment that does not parse is assumed to be cut short and
    /// is dropped without an error.
    pub fn finish(&mut self) -> Vec<FrameResult> {
        let mut out = Vec::new();
        let buffered = std::mem::take(&mut self.buffer);
        let rest = buffered.strip_suffix(b"\r").unwrap_or(&buffered);

        if !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Err(_) => {
                    tracing::debug!(bytes = rest.len(), "Dropping non-UTF-8 trailing fragment");
                }
                Ok(line) => match parse_frame_line(line) {
                    FrameLine::Blank | FrameLine::Comment(_) => {}
                    // A bare name here may be a field cut short mid-word.
                    FrameLine::Field { .. } if !line.contains(':') => {
                        tracing::debug!(bytes = line.len(), "Dropping incomplete trailing line");
                    }
                    FrameLine::Field { name, value } => self.record.push(name, value),
                    FrameLine::Json(text) => match serde_json::from_str(text) {
                        Ok(value) => {
                            self.flush_record(&mut out);
                            out.push(Ok(Frame::json_line(value)));
                        }
                        Err(_) => {
                            tracing::debug!(bytes = text.len(), "Dropping incomplete trailing line");
                        }
                    },
                },
            }
        }

        if let Some(record) = self.record.take() {
            match record.into_frame() {
                Ok(frame) => out.push(Ok(frame)),
                Err(err) => tracing::debug!(%err, "Dropping incomplete trailing record"),
            }
        }

        out
    }

    /// True if no partial line or record is buffered.
    pub fn is_idle(&self) -> bool {
        self.buffer.is_empty() && !self.record.started
    }

    fn process_line(&mut self, raw: &[u8], out: &mut Vec<FrameResult>) {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                // The record this line belonged to can no longer be trusted.
                self.record = PendingRecord::default();
                out.push(Err(StreamError::InvalidUtf8 {
                    message: e.to_string(),
                }));
                return;
            }
        };

        match parse_frame_line(line) {
            FrameLine::Blank => self.flush_record(out),
            FrameLine::Comment(_) => {}
            FrameLine::Field { name, value } => self.record.push(name, value),
            FrameLine::Json(text) => {
                self.flush_record(out);
                out.push(parse_json(text).map(Frame::json_line));
            }
        }
    }

    fn flush_record(&mut self, out: &mut Vec<FrameResult>) {
        if let Some(record) = self.record.take() {
            out.push(record.into_frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frames(results: Vec<FrameResult>) -> Vec<Frame> {
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_json_lines() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(b"{\"a\":1}\n{\"b\":2}\n"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data, Some(json!({"a": 1})));
        assert_eq!(out[1].style, FrameStyle::JsonLine);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"{\"id\":\"m1\",\"con").is_empty());
        assert!(decoder.feed(b"tent\":\"Hel").is_empty());
        let out = frames(decoder.feed(b"lo\"}\r\n"));
        assert_eq!(out[0].data, Some(json!({"id": "m1", "content": "Hello"})));
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let text = "{\"content\":\"caf\u{e9}\"}\n".as_bytes();
        let split = text.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&text[..split]).is_empty());
        let out = frames(decoder.feed(&text[split..]));
        assert_eq!(out[0].data, Some(json!({"content": "café"})));
    }

    #[test]
    fn test_record_with_event_and_multiline_data() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(
            b"event: values\nid: 7\ndata: {\"messages\":\ndata: []}\n\n",
        ));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].style, FrameStyle::Record);
        assert_eq!(out[0].event.as_deref(), Some("values"));
        assert_eq!(out[0].data, Some(json!({"messages": []})));
        assert_eq!(out[0].fields.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_record_split_at_blank_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: messages\ndata: [{\"id\":\"m1\"}]\n").is_empty());
        assert!(!decoder.is_idle());
        let out = frames(decoder.feed(b"\n"));
        assert_eq!(out[0].event.as_deref(), Some("messages"));
    }

    #[test]
    fn test_comments_ignored() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(b": ping\n\n{\"a\":1}\n"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_json_line_closes_pending_record() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(b"event: custom\ndata: {\"x\":1}\n{\"y\":2}\n"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].style, FrameStyle::Record);
        assert_eq!(out[0].data, Some(json!({"x": 1})));
        assert_eq!(out[1].style, FrameStyle::JsonLine);
    }

    #[test]
    fn test_malformed_frame_is_isolated() {
        let mut decoder = FrameDecoder::new();
        let out = decoder.feed(b"{not json}\n{\"ok\":true}\ndata: {broken\n\ndata: 1\n\n");
        assert_eq!(out.len(), 4);
        assert!(matches!(out[0], Err(StreamError::InvalidJson { .. })));
        assert_eq!(out[1].as_ref().unwrap().data, Some(json!({"ok": true})));
        assert!(matches!(out[2], Err(StreamError::InvalidJson { .. })));
        assert_eq!(out[3].as_ref().unwrap().data, Some(json!(1)));
    }

    #[test]
    fn test_invalid_utf8_line() {
        let mut decoder = FrameDecoder::new();
        let out = decoder.feed(b"\xff\xfe\n{\"a\":1}\n");
        assert!(matches!(out[0], Err(StreamError::InvalidUtf8 { .. })));
        assert!(out[1].is_ok());
    }

    #[test]
    fn test_finish_flushes_unterminated_record() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"event: values\ndata: {\"messages\":[]}\n").is_empty());
        let out = frames(decoder.finish());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event.as_deref(), Some("values"));
    }

    #[test]
    fn test_finish_flushes_complete_line_without_newline() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"{\"a\":1}").is_empty());
        let out = frames(decoder.finish());
        assert_eq!(out[0].data, Some(json!({"a": 1})));
    }

    #[test]
    fn test_finish_discards_incomplete_fragment() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(b"{\"a\":1}\n{\"id\":\"m1\",\"cont"));
        assert_eq!(out.len(), 1);
        assert!(decoder.finish().is_empty());
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_finish_discards_truncated_record_data() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"event: messages\n");
        decoder.feed(b"data: [{\"id\":");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_bare_field_name_is_not_a_decode_fault() {
        let mut decoder = FrameDecoder::new();
        let out = decoder.feed(b"event: ping\ndata\n\n{\"a\":1}\n");
        assert_eq!(out.len(), 2);
        let record = out[0].as_ref().unwrap();
        assert_eq!(record.event.as_deref(), Some("ping"));
        assert_eq!(record.data, None);
        assert_eq!(out[1].as_ref().unwrap().data, Some(json!({"a": 1})));
    }

    #[test]
    fn test_finish_drops_truncated_field_name() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"{\"a\":1}\nda");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_record_without_data() {
        let mut decoder = FrameDecoder::new();
        let out = frames(decoder.feed(b"event: end\n\n"));
        assert_eq!(out[0].event.as_deref(), Some("end"));
        assert_eq!(out[0].data, None);
    }
}
