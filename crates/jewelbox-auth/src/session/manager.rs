//! Token manager: the single owner of the session's token pair.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use jewelbox_core::config::SessionConfig;
use jewelbox_core::traits::TokenPersistence;
use jewelbox_core::types::TokenPair;

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;

use super::refresher::RefreshClient;
use super::subscription::{TokenState, TokenSubscription};

/// Outcome of writing a new state through to persistence.
///
/// The in-memory session is updated either way; `Volatile` means it
/// will not survive a restart.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    /// Memory and storage agree.
    Persisted,
    /// Storage rejected the write; holds a [`SessionError::StorageFailure`].
    Volatile {
        /// The storage failure.
        error: SessionError,
    },
}

impl Durability {
    /// Whether the state reached durable storage.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

type RefreshOutcome = Result<TokenPair, SessionError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// The refresh attempt currently in progress.
struct InFlight {
    /// Attempt number, so a finished task only releases its own slot.
    attempt: u64,
    /// Result handle shared by every caller of this attempt.
    outcome: SharedRefresh,
}

/// Owns the current token pair.
///
/// Cloning is cheap; all clones share one session. Construct one at the
/// composition root and hand clones to whatever issues requests.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

struct Inner {
    /// Durable backing store, written only from here.
    store: Arc<dyn TokenPersistence>,
    /// Network side of a refresh.
    refresher: Arc<dyn RefreshClient>,
    /// Time source for expiry decisions.
    clock: Arc<dyn Clock>,
    /// Access tokens this close to expiry are refreshed before use.
    refresh_margin: chrono::Duration,
    /// Current pair. Swapped together with the broadcast below.
    state: RwLock<TokenState>,
    /// Committed state changes.
    changes: broadcast::Sender<TokenState>,
    /// Serializes commits so memory, storage, and observers agree on order.
    commit_lock: tokio::sync::Mutex<()>,
    /// Single-flight refresh slot.
    in_flight: Mutex<Option<InFlight>>,
    /// Attempt counter.
    attempts: AtomicU64,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("store", &self.inner.store.backend_name())
            .field("refresh_margin", &self.inner.refresh_margin)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl TokenManager {
    /// Creates a manager with an empty session using the system clock.
    pub fn new(
        store: Arc<dyn TokenPersistence>,
        refresher: Arc<dyn RefreshClient>,
        config: &SessionConfig,
    ) -> Self {
        Self::with_clock(store, refresher, config, Arc::new(SystemClock))
    }

    /// Creates a manager with an explicit time source.
    pub fn with_clock(
        store: Arc<dyn TokenPersistence>,
        refresher: Arc<dyn RefreshClient>,
        config: &SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (changes, _) = broadcast::channel(config.broadcast_capacity.max(1));
        let margin = i64::try_from(config.refresh_margin_seconds).unwrap_or(i64::MAX);

        Self {
            inner: Arc::new(Inner {
                store,
                refresher,
                clock,
                refresh_margin: chrono::Duration::seconds(margin.min(i64::from(i32::MAX))),
                state: RwLock::new(None),
                changes,
                commit_lock: tokio::sync::Mutex::new(()),
                in_flight: Mutex::new(None),
                attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Adopts the persisted session, if any.
    ///
    /// Never fails: an unreadable store is logged and treated as "no
    /// session". Returns the adopted pair.
    pub async fn load_initial(&self) -> Option<TokenPair> {
        let _commit = self.inner.commit_lock.lock().await;

        let loaded = match self.inner.store.load().await {
            Ok(Some(pair)) if pair.is_well_formed() => Some(pair),
            Ok(Some(_)) => {
                warn!("Persisted session is incomplete, starting signed out");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    backend = self.inner.store.backend_name(),
                    error = %e,
                    "Failed to load persisted session, starting signed out"
                );
                None
            }
        };

        if let Some(pair) = &loaded {
            info!(user_id = %pair.user_id, "Restored persisted session");
            self.inner.publish(Some(pair.clone()));
        }
        loaded
    }

    /// Replaces the session with `pair` (after sign-in, sign-up, or
    /// refresh), writes it through, and notifies observers.
    pub async fn set_tokens(&self, pair: TokenPair) -> Durability {
        let _commit = self.inner.commit_lock.lock().await;
        debug!(user_id = %pair.user_id, "Setting session tokens");
        self.inner.commit(Some(pair)).await
    }

    /// Ends the session in memory and storage and notifies observers.
    pub async fn clear_tokens(&self) -> Durability {
        let _commit = self.inner.commit_lock.lock().await;
        debug!("Clearing session tokens");
        self.inner.commit(None).await
    }

    /// Current access token, without any network call.
    pub fn current_access_token(&self) -> Option<String> {
        self.inner.snapshot().map(|pair| pair.access_token)
    }

    /// Current pair, without any network call.
    pub fn current_tokens(&self) -> TokenState {
        self.inner.snapshot()
    }

    /// Current time according to the manager's clock; issuance instant
    /// for pairs built from sign-in responses.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.inner.clock.now()
    }

    /// Whether a session is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Subscribes to session state changes.
    pub fn subscribe(&self) -> TokenSubscription {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        TokenSubscription::new(state.clone(), self.inner.changes.subscribe())
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// At most one attempt runs at a time: concurrent callers share the
    /// in-flight attempt and all observe its outcome. The attempt runs
    /// on its own task, so dropping any caller (including the one that
    /// started it) does not cancel it.
    ///
    /// The slot is freed by that task once the outcome is committed, which
    /// can be a moment before every waiter has polled the shared result. A
    /// call landing in that gap starts a new attempt against the newly
    /// committed refresh token rather than joining the finished one.
    ///
    /// - [`SessionError::NoRefreshToken`]: nothing stored; no network call.
    /// - [`SessionError::RefreshRejected`]: the session has been cleared.
    /// - [`SessionError::NetworkFailure`]: the stored session is untouched.
    pub async fn refresh_token(&self) -> Result<TokenPair, SessionError> {
        let outcome = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match slot.as_ref() {
                Some(flight) => {
                    debug!(attempt = flight.attempt, "Joining in-flight token refresh");
                    flight.outcome.clone()
                }
                None => {
                    let attempt = self.inner.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(async move {
                        let outcome = inner.run_refresh(attempt).await;
                        inner.release_slot(attempt);
                        outcome
                    });

                    let outcome = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(SessionError::NetworkFailure(format!(
                                "refresh task did not complete: {e}"
                            )))
                        })
                    }
                    .boxed()
                    .shared();

                    *slot = Some(InFlight {
                        attempt,
                        outcome: outcome.clone(),
                    });
                    outcome
                }
            }
        };

        outcome.await
    }

    /// Access token to attach to an outgoing request.
    ///
    /// A token that is expired, or expires within the configured margin,
    /// is refreshed first so a known-stale token is never sent.
    pub async fn access_token_for_request(&self) -> Result<String, SessionError> {
        let pair = self
            .inner
            .snapshot()
            .ok_or(SessionError::NoRefreshToken)?;

        if pair.expires_within(self.inner.clock.now(), self.inner.refresh_margin) {
            debug!(
                user_id = %pair.user_id,
                expiry = %pair.access_token_expiry,
                "Access token stale, refreshing before request"
            );
            return self.refresh_token().await.map(|pair| pair.access_token);
        }

        Ok(pair.access_token)
    }

    /// Recovers from the backend rejecting `rejected_access_token`.
    ///
    /// When another caller has already replaced that token, the current
    /// pair is returned without a network call; otherwise this is
    /// [`refresh_token`](Self::refresh_token).
    pub async fn refresh_after_rejection(
        &self,
        rejected_access_token: &str,
    ) -> Result<TokenPair, SessionError> {
        match self.inner.snapshot() {
            None => Err(SessionError::NoRefreshToken),
            Some(pair) if pair.access_token != rejected_access_token => {
                debug!(user_id = %pair.user_id, "Access token already replaced, reusing it");
                Ok(pair)
            }
            Some(_) => self.refresh_token().await,
        }
    }
}

impl Inner {
    fn snapshot(&self) -> TokenState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap the in-memory state and notify observers as one step.
    fn publish(&self, next: TokenState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = next.clone();
        // No receivers is fine.
        let _ = self.changes.send(next);
    }

    /// Persist `next`, then publish it. Caller holds `commit_lock`.
    async fn commit(&self, next: TokenState) -> Durability {
        let written = match &next {
            Some(pair) => self.store.save(pair).await,
            None => self.store.clear().await,
        };

        let durability = match written {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                warn!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Session storage write failed, continuing in memory"
                );
                Durability::Volatile {
                    error: SessionError::StorageFailure(e.message),
                }
            }
        };

        self.publish(next);
        durability
    }

    /// Commit `next` only if the session still holds `expected_refresh`.
    ///
    /// A sign-out or sign-in that lands while a refresh is on the wire
    /// wins over the refresh outcome.
    async fn commit_if_current(
        &self,
        expected_refresh: &str,
        next: TokenState,
    ) -> Option<Durability> {
        let _commit = self.commit_lock.lock().await;
        let unchanged = self
            .snapshot()
            .is_some_and(|pair| pair.refresh_token == expected_refresh);

        if unchanged {
            Some(self.commit(next).await)
        } else {
            None
        }
    }

    async fn run_refresh(&self, attempt: u64) -> RefreshOutcome {
        let Some(current) = self.snapshot() else {
            debug!(attempt, "No refresh token stored, skipping refresh");
            return Err(SessionError::NoRefreshToken);
        };

        info!(attempt, user_id = %current.user_id, "Refreshing access token");

        match self.refresher.refresh(&current.refresh_token).await {
            Ok(issued) => {
                let Some(pair) =
                    TokenPair::from_issued(issued, self.clock.now(), Some(&current.user_id))
                else {
                    warn!(attempt, "Refresh response carried incomplete credentials");
                    return Err(SessionError::NetworkFailure(
                        "refresh response carried incomplete credentials".to_string(),
                    ));
                };

                match self
                    .commit_if_current(&current.refresh_token, Some(pair.clone()))
                    .await
                {
                    Some(durability) => {
                        if let Durability::Volatile { error } = &durability {
                            warn!(attempt, error = %error, "Refreshed session is not persisted");
                        }
                        info!(
                            attempt,
                            user_id = %pair.user_id,
                            expiry = %pair.access_token_expiry,
                            "Access token refreshed"
                        );
                        Ok(pair)
                    }
                    None => {
                        warn!(attempt, "Session changed during refresh, discarding result");
                        self.snapshot().ok_or(SessionError::NoRefreshToken)
                    }
                }
            }
            Err(SessionError::RefreshRejected { status }) => {
                warn!(
                    attempt,
                    status,
                    user_id = %current.user_id,
                    "Refresh token rejected, ending session"
                );
                if let Some(Durability::Volatile { error }) =
                    self.commit_if_current(&current.refresh_token, None).await
                {
                    warn!(attempt, error = %error, "Rejected session could not be removed from storage");
                }
                Err(SessionError::RefreshRejected { status })
            }
            Err(e) => {
                warn!(attempt, error = %e, "Token refresh failed, keeping stored session");
                Err(e)
            }
        }
    }

    fn release_slot(&self, attempt: u64) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|flight| flight.attempt == attempt) {
            *slot = None;
        }
    }
}
