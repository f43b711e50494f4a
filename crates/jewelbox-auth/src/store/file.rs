//! File-backed token store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::{debug, warn};

use jewelbox_core::error::{AppError, ErrorKind};
use jewelbox_core::result::AppResult;
use jewelbox_core::traits::{TokenPersistence, TokenStream};
use jewelbox_core::types::TokenPair;

use super::watch_stream;

/// On-disk record. Every field is optional so a truncated or hand-edited
/// file is detected as incomplete instead of failing to parse.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    access_token_expiry: Option<DateTime<Utc>>,
    user_id: Option<String>,
}

impl StoredSession {
    fn into_pair(self) -> Option<TokenPair> {
        let pair = TokenPair {
            access_token: self.access_token?,
            refresh_token: self.refresh_token?,
            access_token_expiry: self.access_token_expiry?,
            user_id: self.user_id?,
        };
        pair.is_well_formed().then_some(pair)
    }
}

impl From<&TokenPair> for StoredSession {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: Some(pair.access_token.clone()),
            refresh_token: Some(pair.refresh_token.clone()),
            access_token_expiry: Some(pair.access_token_expiry),
            user_id: Some(pair.user_id.clone()),
        }
    }
}

/// Stores the pair as a JSON document.
///
/// Writes go to a sibling temporary file that is renamed over the
/// target, so readers only ever see a complete record. On Unix the file
/// is readable by the owner only.
#[derive(Debug)]
pub struct FileTokenStore {
    /// Path of the session document.
    path: PathBuf,
    /// Last value written or read, for observers.
    current: watch::Sender<Option<TokenPair>>,
}

impl FileTokenStore {
    /// Opens the store at `path`, seeding observers with any existing
    /// session. An unreadable file does not fail the open; the error
    /// surfaces again from [`TokenPersistence::load`].
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let initial = match read_session(&path).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Session file not readable at open");
                None
            }
        };
        let (current, _) = watch::channel(initial);
        Self { path, current }
    }

    /// Path of the session document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create session directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    async fn write_atomically(&self, bytes: &[u8]) -> AppResult<()> {
        let temp = self.temp_path();

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to open session file: {}", temp.display()),
                e,
            )
        })?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace session file: {}", self.path.display()),
                e,
            )
        })
    }
}

async fn read_session(path: &Path) -> AppResult<Option<TokenPair>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read session file: {}", path.display()),
                e,
            ));
        }
    };

    let stored: StoredSession = match serde_json::from_slice(&bytes) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            return Ok(None);
        }
    };

    let pair = stored.into_pair();
    if pair.is_none() {
        warn!(path = %path.display(), "Ignoring incomplete session file");
    }
    Ok(pair)
}

#[async_trait]
impl TokenPersistence for FileTokenStore {
    fn backend_name(&self) -> &str {
        "file"
    }

    async fn save(&self, pair: &TokenPair) -> AppResult<()> {
        self.ensure_parent().await?;
        let bytes = serde_json::to_vec_pretty(&StoredSession::from(pair))?;
        self.write_atomically(&bytes).await?;
        debug!(path = %self.path.display(), user_id = %pair.user_id, "Session saved");
        self.current.send_replace(Some(pair.clone()));
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<TokenPair>> {
        let pair = read_session(&self.path).await?;
        self.current.send_if_modified(|current| {
            if *current == pair {
                false
            } else {
                *current = pair.clone();
                true
            }
        });
        Ok(pair)
    }

    async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Session file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to remove session file: {}", self.path.display()),
                    e,
                ));
            }
        }
        self.current.send_replace(None);
        Ok(())
    }

    fn observe(&self) -> TokenStream {
        watch_stream(self.current.subscribe())
    }
}
