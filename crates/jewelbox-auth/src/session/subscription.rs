//! Subscriptions to token-state changes.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use jewelbox_core::types::TokenPair;

/// Observable session state: `Some` while signed in.
pub type TokenState = Option<TokenPair>;

/// Receives the token state current at subscription time, then every
/// committed change in commit order.
#[derive(Debug)]
pub struct TokenSubscription {
    /// State captured when the subscription was created, not yet handed out.
    initial: Option<TokenState>,
    /// Committed changes after the snapshot.
    changes: broadcast::Receiver<TokenState>,
}

impl TokenSubscription {
    pub(crate) fn new(initial: TokenState, changes: broadcast::Receiver<TokenState>) -> Self {
        Self {
            initial: Some(initial),
            changes,
        }
    }

    /// Waits for the next state.
    ///
    /// Returns `None` once the token manager has been dropped. A
    /// subscriber that falls behind the channel capacity skips the
    /// oldest changes but still sees the remaining ones in order.
    pub async fn next(&mut self) -> Option<TokenState> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.changes.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Token subscriber lagged behind, skipping states");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns a pending state without waiting, if there is one.
    pub fn try_next(&mut self) -> Option<TokenState> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.changes.try_recv() {
                Ok(state) => return Some(state),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Token subscriber lagged behind, skipping states");
                }
                Err(_) => return None,
            }
        }
    }
}
