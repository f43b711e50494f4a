//! Session credential configuration.

use serde::{Deserialize, Serialize};

/// Where the token pair is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON file on local disk.
    File,
    /// Process memory only; the session ends with the process.
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::File
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Token lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// An access token this close to expiry (in seconds) is refreshed
    /// before a request is sent.
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_seconds: u64,
    /// Persistence backend for the token pair.
    #[serde(default)]
    pub storage: StorageBackend,
    /// Path of the token file when `storage = "file"`.
    #[serde(default = "default_token_file")]
    pub token_file: String,
    /// Buffer size of the token-state broadcast channel.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_margin_seconds: default_refresh_margin(),
            storage: StorageBackend::default(),
            token_file: default_token_file(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_refresh_margin() -> u64 {
    30
}

fn default_token_file() -> String {
    "data/session.json".to_string()
}

fn default_broadcast_capacity() -> usize {
    16
}
