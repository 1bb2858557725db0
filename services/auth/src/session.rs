//! Client-side session persistence
//!
//! The signed-in state survives restarts by keeping the token in a small
//! key-value store. A stored token is trusted only after the account service
//! accepts it again.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use common::config::SessionConfig;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::accounts::UserService;
use crate::error::{AuthError, AuthResult};
use crate::models::{AuthResponse, LoginCredentials, PublicUser, RegisterRequest};

/// Key the token is stored under
pub const AUTH_TOKEN_KEY: &str = "artfolio.auth_token";

/// String key-value storage that outlives the process
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Store backed by a JSON object in a local file
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the configured `session.token_path`
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.token_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; a file that does not parse is deleted and reads as empty
    async fn read_map(&self) -> Result<HashMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(
                    "Discarding corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                match tokio::fs::remove_file(&self.path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("Failed to remove {}", self.path.display())
                        });
                    }
                }
                Ok(HashMap::new())
            }
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// Process-local store, for tests and headless use
#[derive(Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// Session manager keeping the signed-in token in a [`TokenStore`]
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    accounts: UserService,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TokenStore>, accounts: UserService) -> Self {
        Self { store, accounts }
    }

    async fn persist(&self, response: &AuthResponse) -> AuthResult<()> {
        self.store.set(AUTH_TOKEN_KEY, &response.token).await?;
        Ok(())
    }

    pub async fn login(&self, credentials: LoginCredentials) -> AuthResult<AuthResponse> {
        let response = self.accounts.login(credentials).await?;
        self.persist(&response).await?;
        Ok(response)
    }

    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthResponse> {
        let response = self.accounts.register(request).await?;
        self.persist(&response).await?;
        Ok(response)
    }

    /// The stored token, if any
    pub async fn token(&self) -> AuthResult<Option<String>> {
        Ok(self.store.get(AUTH_TOKEN_KEY).await?)
    }

    /// Resume a stored session
    ///
    /// A rejected token is removed from the store, as is an unreadable
    /// session file. Other store failures leave it in place and are returned.
    pub async fn restore(&self) -> AuthResult<Option<PublicUser>> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };

        match self.accounts.current_user(&token).await {
            Ok(user) => {
                info!("Restored session for user {}", user.id);
                Ok(Some(user))
            }
            Err(AuthError::InvalidToken | AuthError::UserNotFound) => {
                info!("Stored session is no longer valid, clearing it");
                self.store.remove(AUTH_TOKEN_KEY).await?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Revoke the stored token and forget it
    pub async fn logout(&self) -> AuthResult<()> {
        if let Some(token) = self.token().await? {
            match self.accounts.logout(&token).await {
                Ok(()) | Err(AuthError::InvalidToken) => {}
                Err(err) => warn!("Failed to revoke token on logout: {}", err),
            }
        }
        self.store.remove(AUTH_TOKEN_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/session.json"));

        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap(), None);
        store.set(AUTH_TOKEN_KEY, "abc").await.unwrap();
        store.set("other", "keep").await.unwrap();
        assert_eq!(
            store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("abc")
        );

        let reopened = FileTokenStore::new(store.path());
        assert_eq!(
            reopened.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("abc")
        );

        reopened.remove(AUTH_TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get("other").await.unwrap().as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty_and_is_removed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileTokenStore::new(path.clone());
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert!(!path.exists());

        tokio::fs::write(&path, "{\"truncated").await.unwrap();
        store.set(AUTH_TOKEN_KEY, "fresh").await.unwrap();
        assert_eq!(
            store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("fresh")
        );
    }

    #[tokio::test]
    async fn memory_store() {
        let store = MemoryTokenStore::new();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
