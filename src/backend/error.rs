//! Backend error types

use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("No access token available; log in first")]
    MissingToken,

    #[error("Not authorised{}", detail_suffix(.detail))]
    Unauthorized { detail: Option<String> },

    #[error("Request rejected with HTTP {status}{}", detail_suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },

    #[error("Could not reach the server: {message}")]
    Transport { message: String },

    #[error("Unexpected response from server: {message}")]
    Decode { message: String },

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

impl ApiError {
    /// The server-provided `detail`, if the request reached the server
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Rejected { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// Server detail when present, otherwise the given fallback text
    pub fn detail_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail().unwrap_or(fallback)
    }
}

impl ContextualError for ApiError {
    fn is_user_actionable(&self) -> bool {
        match self {
            ApiError::MissingToken | ApiError::InvalidUrl { .. } => true,
            ApiError::Unauthorized { .. } | ApiError::Rejected { .. } => self.detail().is_some(),
            ApiError::Transport { .. } | ApiError::Decode { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::MissingToken => {
                Some("No access token available. Run `rollcall login` and pass the token with --token or ROLLCALL_TOKEN.")
            }
            ApiError::InvalidUrl { .. } => Some("The configured api-url is not a valid http(s) URL."),
            _ => self.detail(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
