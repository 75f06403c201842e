//! Unified error type for the weft runtime.

use std::fmt;

use super::category::ErrorCategory;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::store::StoreError;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type.
///
/// Every fallible public operation returns this. Callers branch on
/// [`WeftError::category`] rather than the concrete variant.
#[derive(Debug)]
pub enum WeftError {
    /// Transport fault: request failed, non-2xx, or stream aborted.
    Network(NetworkError),

    /// Frame decoding fault.
    Stream(StreamError),

    /// Persisted key-value store fault.
    Store(StoreError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<WeftError>,
        context: ErrorContext,
    },
}

impl WeftError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            WeftError::Network(err) => match err {
                NetworkError::HttpStatus { .. } => ErrorCategory::Server,
                NetworkError::InvalidResponse { .. } => ErrorCategory::Protocol,
                NetworkError::Cancelled => ErrorCategory::Cancelled,
                _ => ErrorCategory::Network,
            },
            WeftError::Stream(err) => {
                if err.is_frame_local() {
                    ErrorCategory::Protocol
                } else {
                    ErrorCategory::Network
                }
            }
            WeftError::Store(_) => ErrorCategory::Storage,
            WeftError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeftError::Network(err) => err.is_retryable(),
            WeftError::Stream(err) => err.is_retryable(),
            WeftError::Store(_) => false,
            WeftError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// True if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        self.category() == ErrorCategory::Cancelled
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            WeftError::Network(err) => err.user_message(),
            WeftError::Stream(err) => err.user_message(),
            WeftError::Store(err) => format!("Could not access local state: {}", err),
            WeftError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            WeftError::Network(err) => err.error_code(),
            WeftError::Stream(err) => err.error_code(),
            WeftError::Store(err) => err.error_code(),
            WeftError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        WeftError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            WeftError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &WeftError {
        match self {
            WeftError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeftError::Network(err) => write!(f, "{}", err),
            WeftError::Stream(err) => write!(f, "{}", err),
            WeftError::Store(err) => write!(f, "{}", err),
            WeftError::WithContext { error, context } => write!(f, "{} ({})", error, context),
        }
    }
}

impl std::error::Error for WeftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WeftError::Network(err) => Some(err),
            WeftError::Stream(err) => Some(err),
            WeftError::Store(err) => Some(err),
            WeftError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<NetworkError> for WeftError {
    fn from(err: NetworkError) -> Self {
        WeftError::Network(err)
    }
}

impl From<StreamError> for WeftError {
    fn from(err: StreamError) -> Self {
        WeftError::Stream(err)
    }
}

impl From<StoreError> for WeftError {
    fn from(err: StoreError) -> Self {
        WeftError::Store(err)
    }
}

impl From<HttpError> for WeftError {
    fn from(err: HttpError) -> Self {
        WeftError::Network(NetworkError::from_http(err, "unknown"))
    }
}

impl From<serde_json::Error> for WeftError {
    fn from(err: serde_json::Error) -> Self {
        WeftError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}
