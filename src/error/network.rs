//! Transport-level error types.
//!
//! A `NetworkError` means a request to the agent service failed as a whole:
//! it could not be sent, came back with a non-2xx status, or its body stream
//! broke off mid-flight. These always reject the operation that issued them.

use std::fmt;

use crate::traits::HttpError;

/// Transport fault variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the agent service failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out before a response arrived.
    Timeout { operation: String },

    /// Non-2xx response.
    HttpStatus { status: u16, message: String },

    /// The response body stream aborted before the server closed it.
    StreamAborted { message: String },

    /// A non-streaming response body could not be interpreted.
    InvalidResponse { message: String },

    /// Request was cancelled by the caller.
    Cancelled,

    /// Generic transport error.
    Other { message: String },
}

impl NetworkError {
    /// Build a transport fault from an HTTP client error for `url`.
    pub fn from_http(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(_) => NetworkError::Timeout {
                operation: url.to_string(),
            },
            HttpError::Status { status, body } => NetworkError::HttpStatus {
                status,
                message: body,
            },
            HttpError::Body(message) => NetworkError::StreamAborted { message },
            HttpError::InvalidUrl(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Other(message) => NetworkError::Other { message },
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::StreamAborted { .. } => true,
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Returns true for a 404 from the agent service.
    pub fn is_not_found(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status: 404, .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { url, .. } => {
                format!("Unable to reach the agent service at {}.", url)
            }
            NetworkError::Timeout { .. } => {
                "The agent service did not respond in time.".to_string()
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                401 | 403 => "The agent service rejected the credential.".to_string(),
                404 => "The thread was not found on the agent service.".to_string(),
                500..=599 => "The agent service is experiencing issues.".to_string(),
                _ => format!("The agent service returned HTTP {}.", status),
            },
            NetworkError::StreamAborted { .. } => {
                "The response stream was interrupted. Partial output was kept.".to_string()
            }
            NetworkError::InvalidResponse { .. } => {
                "Received an unreadable response from the agent service.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::StreamAborted { .. } => "E_NET_ABORT",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation } => write!(f, "{} timed out", operation),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::StreamAborted { message } => {
                write!(f, "Stream aborted: {}", message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_maps_status() {
        let err = NetworkError::from_http(
            HttpError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            },
            "http://agent/thread/t1",
        );
        assert_eq!(
            err,
            NetworkError::HttpStatus {
                status: 502,
                message: "bad gateway".to_string()
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_http_keeps_url_on_connect_failure() {
        let err = NetworkError::from_http(
            HttpError::ConnectionFailed("refused".to_string()),
            "http://127.0.0.1:1",
        );
        match err {
            NetworkError::ConnectionFailed { url, .. } => assert_eq!(url, "http://127.0.0.1:1"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_body_failure_is_stream_abort() {
        let err = NetworkError::from_http(HttpError::Body("reset".to_string()), "u");
        assert_eq!(err.error_code(), "E_NET_ABORT");
    }

    #[test]
    fn test_not_found() {
        let err = NetworkError::HttpStatus {
            status: 404,
            message: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_client_errors_not_retryable() {
        let err = NetworkError::HttpStatus {
            status: 400,
            message: String::new(),
        };
        assert!(!err.is_retryable());
        assert!(!NetworkError::Cancelled.is_retryable());
    }
}
