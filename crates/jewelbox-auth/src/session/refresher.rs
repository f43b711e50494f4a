//! The network side of a token refresh.

use async_trait::async_trait;

use jewelbox_core::types::IssuedTokens;

use crate::error::SessionError;

/// Exchanges a refresh token for a new issuance.
///
/// Implementations must classify failures: a backend refusal of the
/// refresh token (HTTP 401/403) is [`SessionError::RefreshRejected`];
/// transport errors, timeouts, server errors, and unreadable responses
/// are [`SessionError::NetworkFailure`].
#[async_trait]
pub trait RefreshClient: Send + Sync + 'static {
    /// Perform one refresh call.
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedTokens, SessionError>;
}
