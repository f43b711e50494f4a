//! Client error type.

use thiserror::Error;

use jewelbox_auth::SessionError;
use jewelbox_core::error::{AppError, ErrorKind};

/// Errors returned by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session could not supply or recover a valid access token.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The request never produced a response (connect error, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// A success response could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The request was rejected before being sent.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ApiError {
    /// Status code, for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The user must sign in again.
    pub fn forces_sign_out(&self) -> bool {
        matches!(self, Self::Session(e) if e.forces_sign_out())
    }

    /// Retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Session(e) => e.is_retryable(),
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Validation(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::Transport(format!("timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Session(e) => e.into(),
            ApiError::Status { status, message } => {
                AppError::new(ErrorKind::from_status(status), message)
            }
            ApiError::Transport(message) => AppError::network(message),
            ApiError::Decode(message) => AppError::new(ErrorKind::Serialization, message),
            ApiError::Validation(message) => AppError::validation(message),
        }
    }
}
