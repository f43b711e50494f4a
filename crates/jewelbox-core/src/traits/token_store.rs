//! Persistence trait for the session token pair.

use futures::stream::BoxStream;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::token::TokenPair;

/// A live stream of the persisted token pair (`None` = no session).
pub type TokenStream = BoxStream<'static, Option<TokenPair>>;

/// Durable storage for the token pair.
///
/// Implementations back the session with a platform storage facility
/// (a file, an in-memory slot, a secure keystore). Only the token
/// manager writes to a store; implementations must store and clear the
/// pair as a unit.
#[async_trait]
pub trait TokenPersistence: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "file", "memory").
    fn backend_name(&self) -> &str;

    /// Persist the pair, replacing any previous one.
    async fn save(&self, pair: &TokenPair) -> AppResult<()>;

    /// Load the persisted pair.
    ///
    /// A missing or malformed record is `Ok(None)`; errors are reserved
    /// for I/O failures.
    async fn load(&self) -> AppResult<Option<TokenPair>>;

    /// Remove the persisted pair. Clearing an empty store succeeds.
    async fn clear(&self) -> AppResult<()>;

    /// Observe the persisted pair.
    ///
    /// The stream yields the current value immediately and again after
    /// every save or clear. Each call returns an independent stream.
    fn observe(&self) -> TokenStream;
}
