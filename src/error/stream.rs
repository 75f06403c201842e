//! Stream decoding error types.
//!
//! Decode faults are scoped to a single frame: the pipeline reports them and
//! keeps reading. Only `ConnectionLost` ends a stream.

use std::fmt;

/// Longest excerpt of offending input kept on a decode fault.
const EXCERPT_LEN: usize = 120;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// A frame's JSON payload could not be parsed.
    InvalidJson { excerpt: String, message: String },

    /// A line was not valid UTF-8.
    InvalidUtf8 { message: String },

    /// The byte stream underneath the decoder failed.
    ConnectionLost { message: String },
}

impl StreamError {
    /// Build an `InvalidJson` fault, keeping a short excerpt of the input.
    pub fn invalid_json(input: &str, err: &serde_json::Error) -> Self {
        let excerpt = if input.len() > EXCERPT_LEN {
            let mut end = EXCERPT_LEN;
            while !input.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &input[..end])
        } else {
            input.to_string()
        };
        StreamError::InvalidJson {
            excerpt,
            message: err.to_string(),
        }
    }

    /// True when the fault affects only one frame and decoding may continue.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            StreamError::InvalidJson { .. } | StreamError::InvalidUtf8 { .. }
        )
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::InvalidJson { .. } | StreamError::InvalidUtf8 { .. } => {
                "Skipped a malformed update from the agent service.".to_string()
            }
            StreamError::ConnectionLost { .. } => {
                "Connection to the agent service was lost mid-response.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::InvalidJson { .. } => "E_STREAM_JSON",
            StreamError::InvalidUtf8 { .. } => "E_STREAM_UTF8",
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::InvalidJson { excerpt, message } => {
                write!(f, "Invalid JSON in frame `{}`: {}", excerpt, message)
            }
            StreamError::InvalidUtf8 { message } => write!(f, "Invalid UTF-8 in frame: {}", message),
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
