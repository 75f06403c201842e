//! Adapts a response body into a lazy frame stream.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::Stream;
use futures_util::{stream, StreamExt};

use super::decoder::{FrameDecoder, FrameResult};
use crate::error::StreamError;
use crate::traits::ByteStream;

/// Ordered, finite stream of decoded frames.
pub type FrameStream = Pin<Box<dyn Stream<Item = FrameResult> + Send>>;

struct DecodeState {
    body: ByteStream,
    decoder: FrameDecoder,
    ready: VecDeque<FrameResult>,
    finished: bool,
}

/// Decode `body` into frames as chunks arrive.
///
/// The stream only suspends while waiting on the body. A body error is
/// yielded once as [`StreamError::ConnectionLost`] and ends the stream; bytes
/// still buffered at that point are dropped rather than flushed.
pub fn decode_frames(body: ByteStream) -> FrameStream {
    let state = DecodeState {
        body,
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let frames = state.decoder.feed(&chunk);
                    state.ready.extend(frames);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.ready.push_back(Err(StreamError::ConnectionLost {
                        message: err.to_string(),
                    }));
                }
                None => {
                    state.finished = true;
                    let frames = state.decoder.finish();
                    state.ready.extend(frames);
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use serde_json::json;

    fn body(chunks: Vec<Result<&'static str, HttpError>>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| c.map(|s| Bytes::from_static(s.as_bytes()))),
        ))
    }

    #[tokio::test]
    async fn test_frames_across_chunks() {
        let frames: Vec<_> = decode_frames(body(vec![
            Ok("{\"id\":\"m1\",\"content\":\"Hel\"}\n{\"id\":"),
            Ok("\"m1\",\"content\":\"lo\"}\n"),
        ]))
        .collect()
        .await;

        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[1].as_ref().unwrap().data,
            Some(json!({"id": "m1", "content": "lo"}))
        );
    }

    #[tokio::test]
    async fn test_end_of_stream_flushes() {
        let frames: Vec<_> = decode_frames(body(vec![Ok("event: values\ndata: {}")]))
            .collect()
            .await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap().event.as_deref(), Some("values"));
    }

    #[tokio::test]
    async fn test_body_error_ends_stream() {
        let frames: Vec<_> = decode_frames(body(vec![
            Ok("{\"a\":1}\n"),
            Err(HttpError::Body("connection reset".to_string())),
            Ok("{\"b\":2}\n"),
        ]))
        .collect()
        .await;

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_ok());
        assert!(matches!(
            frames[1],
            Err(StreamError::ConnectionLost { .. })
        ));
    }
}
