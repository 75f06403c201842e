//! Context attached to errors for logging.

use std::fmt;

use chrono::{DateTime, Utc};

/// Where and when an error happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Operation that failed, e.g. `fetch_thread`.
    pub operation: String,

    /// Thread the operation was working on, if any.
    pub thread_id: Option<String>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            thread_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the thread ID for this context.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Formatted `key=value` pairs for log lines.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];
        if let Some(ref thread_id) = self.thread_id {
            parts.push(format!("thread_id={}", thread_id));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));
        parts.join(" ")
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.thread_id {
            Some(ref thread_id) => write!(f, "{} on thread {}", self.operation, thread_id),
            None => write!(f, "{}", self.operation),
        }
    }
}
