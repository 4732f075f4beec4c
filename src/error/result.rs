//! Result type alias for Flowdock operations.

use super::context::ErrorContext;
use super::flowdock_error::FlowdockError;

/// Type alias for Results using FlowdockError.
pub type FlowdockResult<T> = Result<T, FlowdockError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    fn context(self, ctx: ErrorContext) -> FlowdockResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> FlowdockResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<FlowdockError>,
{
    fn context(self, ctx: ErrorContext) -> FlowdockResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> FlowdockResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
