//! Session credential types.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The unit of session state: both credentials, the access token's
/// absolute expiry, and the subject they were issued for.
///
/// A pair is always stored, replaced, and cleared as a whole.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Credential exchanged for a new pair.
    pub refresh_token: String,
    /// Instant the access token stops being accepted.
    pub access_token_expiry: DateTime<Utc>,
    /// Subject the session is bound to.
    pub user_id: String,
}

impl TokenPair {
    /// Build a pair from a backend issuance received at `issued_at`.
    ///
    /// Refresh responses may omit the user id; `fallback_user_id` (the
    /// previous pair's subject) is used in that case.
    pub fn from_issued(
        issued: IssuedTokens,
        issued_at: DateTime<Utc>,
        fallback_user_id: Option<&str>,
    ) -> Option<Self> {
        let user_id = issued
            .user_id
            .filter(|id| !id.is_empty())
            .or_else(|| fallback_user_id.map(str::to_string))?;

        let expires_in = i64::try_from(issued.expires_in).unwrap_or(i64::MAX);
        let pair = Self {
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            access_token_expiry: issued_at + Duration::seconds(expires_in.min(i64::from(i32::MAX))),
            user_id,
        };

        pair.is_well_formed().then_some(pair)
    }

    /// Every credential field is present and non-empty.
    pub fn is_well_formed(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty() && !self.user_id.is_empty()
    }

    /// The access token is expired at `now`, or will be within `margin`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.access_token_expiry <= now + margin
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Token issuance as returned by sign-in, sign-up, and refresh.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    /// New access token.
    pub access_token: String,
    /// New refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Subject identifier, absent on some refresh responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("expires_in", &self.expires_in)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
