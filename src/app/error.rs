//! Application error type

use crate::app::cli::config::ConfigError;
use crate::backend::error::ApiError;
use crate::core::error_handling::ContextualError;
use crate::decoder::error::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Local file or terminal I/O failed
    #[error("{message}")]
    Io { message: String },

    /// The scan ended without recording attendance
    #[error("{message}")]
    ScanFailed { message: String },
}

impl AppError {
    pub fn io(context: impl std::fmt::Display, source: std::io::Error) -> Self {
        AppError::Io {
            message: format!("{}: {}", context, source),
        }
    }
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Config(e) => e.is_user_actionable(),
            AppError::Api(e) => e.is_user_actionable(),
            AppError::Decode(e) => e.is_user_actionable(),
            AppError::Io { .. } | AppError::ScanFailed { .. } => true,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Api(e) => e.user_message(),
            AppError::Decode(e) => e.user_message(),
            AppError::Io { message } | AppError::ScanFailed { message } => Some(message),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
