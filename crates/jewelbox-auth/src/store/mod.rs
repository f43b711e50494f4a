//! Persistence adapters for the session token pair.
//!
//! - **file**: JSON document on local disk ([`FileTokenStore`])
//! - **memory**: process-local slot ([`MemoryTokenStore`])
//!
//! The adapter is selected at runtime based on configuration.

pub mod file;
pub mod memory;

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::info;

use jewelbox_core::config::{SessionConfig, StorageBackend};
use jewelbox_core::result::AppResult;
use jewelbox_core::traits::{TokenPersistence, TokenStream};
use jewelbox_core::types::TokenPair;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Open the adapter selected by `config.storage`.
pub async fn open_store(config: &SessionConfig) -> AppResult<Arc<dyn TokenPersistence>> {
    let store: Arc<dyn TokenPersistence> = match config.storage {
        StorageBackend::File => {
            info!(path = %config.token_file, "Using file token store");
            Arc::new(FileTokenStore::open(&config.token_file).await)
        }
        StorageBackend::Memory => {
            info!("Using in-memory token store");
            Arc::new(MemoryTokenStore::new())
        }
    };
    Ok(store)
}

/// Turn a watch channel into a stream that yields the current value
/// first and then every published change.
pub(crate) fn watch_stream(mut rx: watch::Receiver<Option<TokenPair>>) -> TokenStream {
    rx.mark_changed();
    futures::stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let value = rx.borrow_and_update().clone();
        Some((value, rx))
    })
    .boxed()
}
