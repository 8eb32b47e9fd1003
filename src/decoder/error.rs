//! Decoder error types

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The image was readable but held no QR code
    #[error("No QR code found in the image")]
    NotFound,

    /// The input is not image data
    #[error("Not a valid image: {reason}")]
    InvalidInput { reason: String },

    /// Camera unavailable, busy, or lost mid-session
    #[error("Camera unavailable: {message}")]
    Device { message: String },
}

impl DecodeError {
    pub fn device(message: impl Into<String>) -> Self {
        DecodeError::Device {
            message: message.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        DecodeError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl ContextualError for DecodeError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, DecodeError::NotFound | DecodeError::InvalidInput { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            DecodeError::NotFound => {
                Some("No QR code found in the image. Please try another image.")
            }
            DecodeError::InvalidInput { .. } => Some("Please select a valid image file."),
            DecodeError::Device { .. } => None,
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
