//! Encrypting wrapper that turns any key-value store into secure storage.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{DeviceKeystore, KeyValueStore, StorageError, StorageResult};

/// Domain separator mixed into the associated data of every sealed value.
const SEALED_VALUE_AD_PREFIX: &[u8] = b"postkit:sealed-value:";

/// [`KeyValueStore`] that seals values with a [`DeviceKeystore`] before
/// handing them to the inner store.
///
/// Each value is bound to its key through the associated data, so a sealed
/// value copied under another key fails to open. Sealed bytes are stored
/// base64-encoded.
pub struct SealedStore<S> {
    inner: S,
    keystore: Arc<dyn DeviceKeystore>,
}

impl<S: KeyValueStore> SealedStore<S> {
    /// Wraps `inner`, sealing values with `keystore`.
    #[must_use]
    pub fn new(inner: S, keystore: Arc<dyn DeviceKeystore>) -> Self {
        Self { inner, keystore }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> std::fmt::Debug for SealedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedStore").finish_non_exhaustive()
    }
}

fn associated_data(key: &str) -> Vec<u8> {
    let mut ad = Vec::with_capacity(SEALED_VALUE_AD_PREFIX.len() + key.len());
    ad.extend_from_slice(SEALED_VALUE_AD_PREFIX);
    ad.extend_from_slice(key.as_bytes());
    ad
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for SealedStore<S> {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let Some(encoded) = self.inner.get(key).await? else {
            return Ok(None);
        };
        let sealed = STANDARD
            .decode(encoded.trim())
            .map_err(|e| StorageError::read(key, format!("invalid sealed encoding: {e}")))?;
        let plaintext = self.keystore.open(&associated_data(key), &sealed)?;
        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|e| StorageError::read(key, format!("sealed value is not UTF-8: {e}")))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let sealed = self.keystore.seal(&associated_data(key), value.as_bytes())?;
        self.inner.set(key, &STANDARD.encode(sealed)).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SoftwareKeystore};

    fn sealed_memory() -> (MemoryStore, SealedStore<MemoryStore>) {
        let backing = MemoryStore::new();
        let store = SealedStore::new(backing.clone(), Arc::new(SoftwareKeystore::generate()));
        (backing, store)
    }

    #[tokio::test]
    async fn test_values_are_not_stored_in_plaintext() {
        let (backing, store) = sealed_memory();
        store.set("current_user", "alice@example.com").await.unwrap();

        let raw = backing.get("current_user").await.unwrap().unwrap();
        assert!(!raw.contains("alice"));
        assert_eq!(
            store.get("current_user").await.unwrap().as_deref(),
            Some("alice@example.com")
        );
    }

    #[tokio::test]
    async fn test_value_moved_to_other_key_fails_to_open() {
        let (backing, store) = sealed_memory();
        store.set("users", "[]").await.unwrap();
        let raw = backing.get("users").await.unwrap().unwrap();
        backing.set("current_user", &raw).await.unwrap();

        assert!(matches!(
            store.get("current_user").await,
            Err(StorageError::Keystore(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_is_a_read_error() {
        let (backing, store) = sealed_memory();
        backing.set("users", "not base64 !!").await.unwrap();
        assert!(matches!(store.get("users").await, Err(StorageError::Read { .. })));
    }

    #[tokio::test]
    async fn test_missing_and_remove() {
        let (_, store) = sealed_memory();
        assert_eq!(store.get("users").await.unwrap(), None);
        store.set("users", "[]").await.unwrap();
        store.remove("users").await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), None);
        assert!(store.inner().get("users").await.unwrap().is_none());
    }
}
