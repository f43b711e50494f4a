//! In-memory token store.

use async_trait::async_trait;
use tokio::sync::watch;

use jewelbox_core::result::AppResult;
use jewelbox_core::traits::{TokenPersistence, TokenStream};
use jewelbox_core::types::TokenPair;

use super::watch_stream;

/// Keeps the pair in process memory only.
///
/// Used for ephemeral sessions and as the test double for durable
/// storage.
#[derive(Debug)]
pub struct MemoryTokenStore {
    slot: watch::Sender<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_pair(None)
    }

    /// Creates a store that already holds `pair`.
    pub fn with_pair(pair: Option<TokenPair>) -> Self {
        let (slot, _) = watch::channel(pair);
        Self { slot }
    }

    /// Returns the stored pair without going through the trait.
    pub fn snapshot(&self) -> Option<TokenPair> {
        self.slot.borrow().clone()
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenPersistence for MemoryTokenStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn save(&self, pair: &TokenPair) -> AppResult<()> {
        self.slot.send_replace(Some(pair.clone()));
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<TokenPair>> {
        Ok(self.snapshot())
    }

    async fn clear(&self) -> AppResult<()> {
        self.slot.send_replace(None);
        Ok(())
    }

    fn observe(&self) -> TokenStream {
        watch_stream(self.slot.subscribe())
    }
}
