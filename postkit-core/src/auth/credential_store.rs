//! Persistence for user records and the session marker.

use std::sync::Arc;

use crate::storage::{KeyValueStore, StorageResult, CURRENT_USER_KEY, USERS_KEY};

use super::user::User;

/// Reads and writes user records and the session marker in secure storage.
///
/// The backing store should be a secure one (for example a
/// [`crate::storage::SealedStore`]); this type does no encryption itself.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a credential store over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Returns every registered user.
    ///
    /// Missing data yields an empty list. Read or parse failures are logged
    /// and also yield an empty list.
    pub async fn get_users(&self) -> Vec<User> {
        self.load_users().await.unwrap_or_else(|e| {
            log::error!("Error getting users: {e}");
            Vec::new()
        })
    }

    /// Reads the user collection, failing instead of falling back to an
    /// empty list. Read-modify-write paths go through here so a failed read
    /// never replaces the stored users.
    pub(crate) async fn load_users(&self) -> StorageResult<Vec<User>> {
        match self.storage.get(USERS_KEY).await? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the stored user collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted.
    pub async fn save_users(&self, users: &[User]) -> StorageResult<()> {
        let data = serde_json::to_string(users)?;
        self.storage
            .set(USERS_KEY, &data)
            .await
            .inspect_err(|e| log::error!("Error saving users: {e}"))
    }

    /// Finds a user by exact email match.
    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.get_users()
            .await
            .into_iter()
            .find(|user| user.email == email)
    }

    /// Returns the email stored in the session marker.
    ///
    /// Read failures are logged and reported as no session.
    pub async fn get_current_user(&self) -> Option<String> {
        match self.storage.get(CURRENT_USER_KEY).await {
            Ok(email) => email.filter(|e| !e.is_empty()),
            Err(e) => {
                log::error!("Error reading current user: {e}");
                None
            }
        }
    }

    /// Sets the session marker to `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be written.
    pub async fn set_current_user(&self, email: &str) -> StorageResult<()> {
        self.storage.set(CURRENT_USER_KEY, email).await
    }

    /// Clears the session marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be removed.
    pub async fn clear_current_user(&self) -> StorageResult<()> {
        self.storage.remove(CURRENT_USER_KEY).await
    }
}
