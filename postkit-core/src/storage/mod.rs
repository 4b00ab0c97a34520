//! Key-value storage primitives shared by the credential and post stores.
//!
//! The stores in this crate depend on platform-provided persistence through
//! the [`KeyValueStore`] trait. Values are UTF-8 strings (JSON for
//! collections) addressed by short string keys.
//!
//! # Backends
//!
//! - [`MemoryStore`]: mutex-guarded map for tests and ephemeral sessions
//! - [`FileStore`]: one file per key with atomic replace
//! - [`SealedStore`]: wraps another store and seals every value with a
//!   [`DeviceKeystore`], used for the "secure" credential storage

mod error;
mod file;
mod keystore;
mod memory;
mod sealed;

#[cfg(test)]
pub(crate) mod tests_utils;

use async_trait::async_trait;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use keystore::{DeviceKeystore, SoftwareKeystore};
pub use memory::MemoryStore;
pub use sealed::SealedStore;

/// Key holding the JSON array of user-authored posts, newest first.
pub const USER_POSTS_KEY: &str = "user_posts";
/// Key holding the JSON array of registered users (secure storage).
pub const USERS_KEY: &str = "users";
/// Key holding the email of the signed-in user (secure storage).
pub const CURRENT_USER_KEY: &str = "current_user";

/// Asynchronous string key-value storage.
///
/// Implementations must make `set` atomic from the caller's perspective:
/// a concurrent or subsequent `get` observes either the old or the new value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
