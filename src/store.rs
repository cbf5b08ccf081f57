// Secure credential storage
//
// Exactly one bearer token is persisted per installation, under a fixed
// key. Absence means "unauthenticated". Callers treat a failed read as
// no token and swallow write/delete failures; a locked keystore must
// never abort an in-flight request.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Fixed identifier the token is stored under.
pub const TOKEN_KEY: &str = "agrotrade_token";

/// The platform keystore rejected an operation (locked, missing, denied).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("keystore unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for the bearer token.
///
/// Atomic replace-on-write; the session manager is the only writer, so
/// a read racing a write resolves last-write-wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(&self, token: &str) -> Result<(), StorageError>;
    async fn read(&self) -> Result<Option<String>, StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Token storage backed by the platform keystore.
///
/// Keystore calls are blocking, so each one runs on the blocking pool.
pub struct KeyringStore {
    service: String,
    key: String,
}

impl KeyringStore {
    pub fn new(service: &str, key: &str) -> Self {
        Self {
            service: service.to_string(),
            key: key.to_string(),
        }
    }

    fn entry(service: &str, key: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(service, key).map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn save(&self, token: &str) -> Result<(), StorageError> {
        let (service, key) = (self.service.clone(), self.key.clone());
        let token = token.to_string();

        tokio::task::spawn_blocking(move || {
            Self::entry(&service, &key)?
                .set_password(&token)
                .map_err(|e| StorageError::Unavailable(e.to_string()))
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }

    async fn read(&self) -> Result<Option<String>, StorageError> {
        let (service, key) = (self.service.clone(), self.key.clone());

        tokio::task::spawn_blocking(move || match Self::entry(&service, &key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let (service, key) = (self.service.clone(), self.key.clone());

        tokio::task::spawn_blocking(move || {
            match Self::entry(&service, &key)?.delete_password() {
                // Clearing an absent token is a no-op
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StorageError::Unavailable(e.to_string())),
            }
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}

/// In-memory token storage for tests and keystore-less environments.
/// Does not survive process restarts.
#[derive(Default)]
pub struct MemoryStore {
    token: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.read().await.unwrap(), None);

        store.save("tok-123").await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some("tok-123".to_string()));

        store.clear().await.unwrap();
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_replace_on_write() {
        let store = MemoryStore::new();
        store.save("first").await.unwrap();
        store.save("second").await.unwrap();

        // At most one token is persisted at a time
        assert_eq!(store.read().await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_clear_is_idempotent() {
        let store = MemoryStore::new();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.read().await.unwrap(), None);
    }
}
