//! Generic error reporting
//!
//! Errors that can tell an operator exactly what to fix carry a user message;
//! everything else is reported with a generic context line and the details are
//! kept at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`. When it returns `false`, `user_message()` returns `None`.
pub trait ContextualError: std::error::Error {
    /// True if the error carries a message the user can act on directly
    /// (bad configuration, rejected password, unreadable image file).
    fn is_user_actionable(&self) -> bool;

    /// The specific user message for actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with a level of detail that matches its specificity
///
/// ```rust,no_run
/// # use rollcall::core::error_handling::log_error_with_context;
/// # use rollcall::backend::ApiError;
/// let err = ApiError::MissingToken;
/// log_error_with_context(&err, "Recording attendance");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}", user_msg);
        }
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Render the line shown to the operator for a failed operation
pub fn describe_error<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => user_msg.to_string(),
        _ => format!("{}: {}", operation_context, error),
    }
}
