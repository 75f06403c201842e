//! Error category classification.
//!
//! Categories let callers pick a handling strategy (retry, surface, ignore)
//! without matching on every concrete error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The agent service could not be reached or the connection dropped.
    Network,

    /// The agent service answered with an error status.
    Server,

    /// The agent service answered with something this client cannot read.
    Protocol,

    /// The local key-value store failed.
    Storage,

    /// The caller cancelled the operation.
    Cancelled,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Storage => "storage",
            ErrorCategory::Cancelled => "cancelled",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the agent service is running and reachable",
            ErrorCategory::Server => "The agent service reported an error. Try again shortly",
            ErrorCategory::Protocol => "The agent service may be running an incompatible version",
            ErrorCategory::Storage => "Check permissions on the data directory",
            ErrorCategory::Cancelled => "Submit again when ready",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
