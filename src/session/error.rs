//! Scan session error types

use crate::core::error_handling::ContextualError;

const INVALID_PAYLOAD_MESSAGE: &str = "Invalid QR code format. Could not extract student ID.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// The decoded text carries no usable student identifier
    #[error("Invalid QR code format. Could not extract student ID.")]
    InvalidPayload { payload: String },
}

impl PayloadError {
    pub fn invalid(payload: impl Into<String>) -> Self {
        PayloadError::InvalidPayload {
            payload: payload.into(),
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            PayloadError::InvalidPayload { payload } => payload,
        }
    }
}

impl ContextualError for PayloadError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(INVALID_PAYLOAD_MESSAGE)
    }
}

pub type PayloadResult<T> = Result<T, PayloadError>;
