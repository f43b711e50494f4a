//! Classified session errors.

use thiserror::Error;

use jewelbox_core::error::{AppError, ErrorKind};

/// Why a session operation failed.
///
/// The variants drive different reactions: `NoRefreshToken` and
/// `RefreshRejected` force a sign-out, `NetworkFailure` is retryable and
/// leaves the stored pair untouched, `StorageFailure` is only ever a
/// warning, and `AuthenticationFinal` ends one request without touching
/// the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No refresh token is stored (never signed in, signed out, or cleared).
    #[error("No session credentials stored")]
    NoRefreshToken,

    /// The backend refused the refresh token itself.
    #[error("Refresh token rejected by the server (HTTP {status})")]
    RefreshRejected {
        /// Status code the backend answered with.
        status: u16,
    },

    /// Transport failure, timeout, or server-side error while refreshing.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The pair could not be written to or cleared from durable storage.
    #[error("Token storage failure: {0}")]
    StorageFailure(String),

    /// A request was rejected again after a successful refresh.
    #[error("Request rejected after token refresh")]
    AuthenticationFinal,
}

impl SessionError {
    /// The session is unusable and the user must sign in again.
    pub fn forces_sign_out(&self) -> bool {
        matches!(self, Self::NoRefreshToken | Self::RefreshRejected { .. })
    }

    /// Retrying later (e.g. once connectivity returns) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoRefreshToken | Self::RefreshRejected { .. } | Self::AuthenticationFinal => {
                "Your session has ended, please sign in again"
            }
            Self::NetworkFailure(_) => "Could not reach the server, check your connection",
            Self::StorageFailure(_) => "Your session could not be saved on this device",
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        let kind = match &err {
            SessionError::NoRefreshToken
            | SessionError::RefreshRejected { .. }
            | SessionError::AuthenticationFinal => ErrorKind::Authentication,
            SessionError::NetworkFailure(_) => ErrorKind::Network,
            SessionError::StorageFailure(_) => ErrorKind::Storage,
        };
        AppError::with_source(kind, err.user_message(), err)
    }
}
