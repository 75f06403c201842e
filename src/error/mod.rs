//! Unified error handling.
//!
//! - [`NetworkError`]: transport faults. Reject the operation.
//! - [`StreamError`]: decode faults. Frame-local unless the byte stream itself broke.
//! - [`StoreError`]: the persisted key-value slots failed.
//! - [`WeftError`]: the union returned by public operations, with
//!   [`ErrorCategory`] for handling decisions and optional [`ErrorContext`].
//!
//! Unknown event kinds and merges into a missing UI element are not errors;
//! they are logged and absorbed by the normalizer and reducer.
//!
//! | Category  | Typical cause                         | Retryable |
//! |-----------|---------------------------------------|-----------|
//! | Network   | connect failure, stream cut mid-flight | Yes      |
//! | Server    | non-2xx from the agent service         | 5xx only |
//! | Protocol  | unreadable response body               | No       |
//! | Storage   | key-value store I/O                    | No       |
//! | Cancelled | caller cancelled the submission        | No       |

mod category;
mod context;
mod network;
mod result;
mod store;
mod stream;
mod weft_error;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{ResultExt, WeftResult};
pub use store::StoreError;
pub use stream::StreamError;
pub use weft_error::WeftError;
