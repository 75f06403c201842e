//! Result alias and context helpers.

use super::context::ErrorContext;
use super::weft_error::WeftError;

/// Type alias for Results using WeftError.
pub type WeftResult<T> = Result<T, WeftError>;

/// Extension trait for attaching [`ErrorContext`] to a failing result.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// ```ignore
    /// client.fetch_thread(id).await
    ///     .context(ErrorContext::new("fetch_thread").with_thread_id(id))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> WeftResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> WeftResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<WeftError>,
{
    fn context(self, ctx: ErrorContext) -> WeftResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> WeftResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
