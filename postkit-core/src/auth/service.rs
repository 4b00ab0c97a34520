//! Local email/password authentication over the credential store.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::error::PostKitResult;
use crate::storage::KeyValueStore;

use super::biometric::{
    self, BiometricAuthenticator, BiometricAvailability, NoBiometrics,
    BIOMETRIC_NOT_SUPPORTED_MESSAGE,
};
use super::credential_store::CredentialStore;
use super::password::{hash_password, verify_password};
use super::user::User;

const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required";
const EMAIL_EXISTS_MESSAGE: &str = "Email already exists";

/// Whether a user is signed in, and who.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthStatus {
    /// A valid session exists.
    pub is_authenticated: bool,
    /// Email of the signed-in user.
    pub email: Option<String>,
}

impl AuthStatus {
    /// Status for a signed-in `email`.
    #[must_use]
    pub const fn authenticated(email: String) -> Self {
        Self {
            is_authenticated: true,
            email: Some(email),
        }
    }

    /// Status with no session.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            email: None,
        }
    }
}

/// Result of a signup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupOutcome {
    /// The account was created and signed in.
    pub success: bool,
    /// Reason shown to the user when `success` is false.
    pub message: Option<String>,
    /// Hint that the caller may offer biometric enrollment.
    pub ask_biometric: bool,
}

impl SignupOutcome {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            ask_biometric: false,
        }
    }
}

/// Result of a biometric operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricOutcome {
    /// The operation took effect.
    pub success: bool,
    /// Explanation shown to the user, if any.
    pub message: Option<String>,
}

impl BiometricOutcome {
    fn not_supported() -> Self {
        log::warn!("{BIOMETRIC_NOT_SUPPORTED_MESSAGE}");
        Self {
            success: false,
            message: Some(BIOMETRIC_NOT_SUPPORTED_MESSAGE.to_string()),
        }
    }
}

/// Signup, login, logout and session checks against local credentials.
///
/// The service is the single owner of the session marker: every operation
/// that writes credentials runs under one async lock, and status changes are
/// published to [`AuthService::subscribe`] receivers.
///
/// Emails are compared exactly; normalize them with
/// [`crate::auth::normalize_email`] before calling.
pub struct AuthService {
    credentials: CredentialStore,
    biometrics: Arc<dyn BiometricAuthenticator>,
    writes: Mutex<()>,
    status: watch::Sender<AuthStatus>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a service over secure `storage`, with no biometric hardware.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            credentials: CredentialStore::new(storage),
            biometrics: Arc::new(NoBiometrics),
            writes: Mutex::new(()),
            status: watch::Sender::new(AuthStatus::unauthenticated()),
        }
    }

    /// Uses `biometrics` for capability probing.
    #[must_use]
    pub fn with_biometrics(mut self, biometrics: Arc<dyn BiometricAuthenticator>) -> Self {
        self.biometrics = biometrics;
        self
    }

    /// Returns the underlying credential store.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Subscribes to auth status changes.
    ///
    /// The receiver starts with the last published status.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    /// Last published auth status, without touching storage.
    #[must_use]
    pub fn current_status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    /// Registers a new user and signs them in.
    ///
    /// Empty fields and already registered emails are rejected with a
    /// message. On success the caller is hinted to offer biometric
    /// enrollment.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the registered users cannot be read or the
    /// user record or session marker cannot be persisted. Stored users are
    /// left untouched when the read fails.
    pub async fn signup(&self, email: &str, password: &str) -> PostKitResult<SignupOutcome> {
        if email.is_empty() || password.is_empty() {
            return Ok(SignupOutcome::rejected(MISSING_CREDENTIALS_MESSAGE));
        }

        let _guard = self.writes.lock().await;
        let mut users = self.credentials.load_users().await?;
        if users.iter().any(|user| user.email == email) {
            return Ok(SignupOutcome::rejected(EMAIL_EXISTS_MESSAGE));
        }

        users.push(User {
            email: email.to_string(),
            hashed_password: hash_password(password),
            biometric_enabled: false,
        });
        self.credentials.save_users(&users).await?;
        self.credentials.set_current_user(email).await?;
        self.status
            .send_replace(AuthStatus::authenticated(email.to_string()));
        log::info!("signed up new user, {} registered", users.len());

        Ok(SignupOutcome {
            success: true,
            message: None,
            ask_biometric: true,
        })
    }

    /// Signs in with email and password.
    ///
    /// Returns `false` for empty fields, unknown emails and wrong passwords;
    /// the session is left untouched in those cases.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session marker cannot be written.
    pub async fn login(&self, email: &str, password: &str) -> PostKitResult<bool> {
        if email.is_empty() || password.is_empty() {
            return Ok(false);
        }

        let _guard = self.writes.lock().await;
        let Some(user) = self.credentials.find_user_by_email(email).await else {
            log::debug!("login rejected: unknown user");
            return Ok(false);
        };
        if !verify_password(password, &user.hashed_password) {
            log::debug!("login rejected: password mismatch");
            return Ok(false);
        }

        self.credentials.set_current_user(email).await?;
        self.status
            .send_replace(AuthStatus::authenticated(email.to_string()));
        Ok(true)
    }

    /// Biometric sign-in. Not supported in this build: always declines and
    /// leaves the session untouched.
    #[must_use]
    pub fn login_with_biometric(&self) -> BiometricOutcome {
        BiometricOutcome::not_supported()
    }

    /// Clears the session marker. User records are kept.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the marker cannot be removed.
    pub async fn logout(&self) -> PostKitResult<()> {
        let _guard = self.writes.lock().await;
        self.credentials
            .clear_current_user()
            .await
            .inspect_err(|e| log::error!("Logout error: {e}"))?;
        self.status.send_replace(AuthStatus::unauthenticated());
        Ok(())
    }

    /// Reads the session marker and validates it against the user records.
    ///
    /// A marker naming an unknown user reads as unauthenticated; storage is
    /// not modified. The result is also published to subscribers.
    pub async fn check_auth_status(&self) -> AuthStatus {
        let status = match self.credentials.get_current_user().await {
            Some(email) => {
                if self.credentials.find_user_by_email(&email).await.is_some() {
                    AuthStatus::authenticated(email)
                } else {
                    log::warn!("session marker references an unknown user");
                    AuthStatus::unauthenticated()
                }
            }
            None => AuthStatus::unauthenticated(),
        };
        self.status.send_replace(status.clone());
        status
    }

    /// Updates the biometric flag of the signed-in user.
    ///
    /// Disabling succeeds when a session with a matching user exists.
    /// Enabling is not supported in this build and always declines.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the user records cannot be read or the
    /// updated records cannot be persisted.
    pub async fn update_biometric_setting(&self, enabled: bool) -> PostKitResult<BiometricOutcome> {
        if enabled {
            return Ok(BiometricOutcome::not_supported());
        }

        let _guard = self.writes.lock().await;
        let declined = BiometricOutcome {
            success: false,
            message: None,
        };
        let Some(email) = self.credentials.get_current_user().await else {
            return Ok(declined);
        };
        let mut users = self.credentials.load_users().await?;
        let Some(user) = users.iter_mut().find(|user| user.email == email) else {
            return Ok(declined);
        };
        user.biometric_enabled = false;
        self.credentials.save_users(&users).await?;

        Ok(BiometricOutcome {
            success: true,
            message: None,
        })
    }

    /// Reports whether the device could offer biometric sign-in.
    #[must_use]
    pub fn biometric_availability(&self) -> BiometricAvailability {
        biometric::probe(self.biometrics.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests_utils::FaultyStore;
    use crate::storage::{MemoryStore, StorageError, CURRENT_USER_KEY, USERS_KEY};
    use crate::PostKitError;

    fn service() -> (Arc<FaultyStore>, AuthService) {
        let store = Arc::new(FaultyStore::new());
        let service = AuthService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_signup_signs_in() {
        let (_, auth) = service();
        let outcome = auth.signup("ana@example.com", "pw").await.unwrap();
        assert_eq!(
            outcome,
            SignupOutcome {
                success: true,
                message: None,
                ask_biometric: true,
            }
        );
        assert_eq!(
            auth.check_auth_status().await,
            AuthStatus::authenticated("ana@example.com".to_string())
        );

        let user = auth
            .credentials()
            .find_user_by_email("ana@example.com")
            .await
            .unwrap();
        assert!(!user.biometric_enabled);
        assert_eq!(user.hashed_password, hash_password("pw"));
    }

    #[tokio::test]
    async fn test_signup_rejections() {
        let (_, auth) = service();
        let empty = auth.signup("", "pw").await.unwrap();
        assert!(!empty.success);
        assert_eq!(empty.message.as_deref(), Some(MISSING_CREDENTIALS_MESSAGE));
        assert!(!auth.signup("a@b.co", "").await.unwrap().success);

        assert!(auth.signup("a@b.co", "pw").await.unwrap().success);
        let duplicate = auth.signup("a@b.co", "other").await.unwrap();
        assert!(!duplicate.success);
        assert!(!duplicate.ask_biometric);
        assert_eq!(duplicate.message.as_deref(), Some(EMAIL_EXISTS_MESSAGE));
        assert_eq!(auth.credentials().get_users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_signup_write_failure_aborts() {
        let (store, auth) = service();
        store.fail_writes(true);
        assert!(matches!(
            auth.signup("a@b.co", "pw").await,
            Err(PostKitError::Storage(_))
        ));
        store.fail_writes(false);
        assert!(auth.credentials().get_users().await.is_empty());
        assert!(!auth.current_status().is_authenticated);
    }

    #[tokio::test]
    async fn test_signup_read_failure_keeps_existing_users() {
        let (store, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.signup("c@d.co", "pw").await.unwrap();

        store.fail_reads(true);
        assert!(matches!(
            auth.signup("e@f.co", "pw").await,
            Err(PostKitError::Storage(_))
        ));
        store.fail_reads(false);

        let emails: Vec<_> = auth
            .credentials()
            .get_users()
            .await
            .into_iter()
            .map(|user| user.email)
            .collect();
        assert_eq!(emails, ["a@b.co", "c@d.co"]);
        assert_eq!(
            auth.check_auth_status().await.email.as_deref(),
            Some("c@d.co")
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_over_corrupt_users() {
        let (store, auth) = service();
        store.memory().set(USERS_KEY, "[{\"email\":").await.unwrap();
        assert!(matches!(
            auth.signup("a@b.co", "pw").await,
            Err(PostKitError::Storage(StorageError::Serialization(_)))
        ));
        assert_eq!(
            store.memory().get(USERS_KEY).await.unwrap().as_deref(),
            Some("[{\"email\":")
        );
    }

    #[tokio::test]
    async fn test_login() {
        let (_, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.logout().await.unwrap();

        assert!(!auth.login("a@b.co", "wrong").await.unwrap());
        assert!(!auth.check_auth_status().await.is_authenticated);
        assert!(!auth.login("nobody@b.co", "pw").await.unwrap());
        assert!(!auth.login("", "pw").await.unwrap());

        assert!(auth.login("a@b.co", "pw").await.unwrap());
        assert_eq!(
            auth.check_auth_status().await.email.as_deref(),
            Some("a@b.co")
        );
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (_, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.signup("c@d.co", "pw2").await.unwrap();

        assert!(!auth.login("a@b.co", "nope").await.unwrap());
        assert_eq!(
            auth.check_auth_status().await.email.as_deref(),
            Some("c@d.co")
        );
    }

    #[tokio::test]
    async fn test_logout_keeps_users() {
        let (store, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.logout().await.unwrap();
        assert_eq!(auth.check_auth_status().await, AuthStatus::unauthenticated());
        assert_eq!(auth.credentials().get_users().await.len(), 1);

        store.fail_writes(true);
        assert!(auth.logout().await.is_err());
    }

    #[tokio::test]
    async fn test_dangling_session_is_not_authenticated() {
        let memory = MemoryStore::new();
        memory.set(CURRENT_USER_KEY, "ghost@b.co").await.unwrap();
        let auth = AuthService::new(Arc::new(memory.clone()));

        assert_eq!(auth.check_auth_status().await, AuthStatus::unauthenticated());
        assert_eq!(
            memory.get(CURRENT_USER_KEY).await.unwrap().as_deref(),
            Some("ghost@b.co")
        );
    }

    #[tokio::test]
    async fn test_biometric_paths_decline() {
        let (_, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.logout().await.unwrap();

        let outcome = auth.login_with_biometric();
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some(BIOMETRIC_NOT_SUPPORTED_MESSAGE));
        assert!(!auth.check_auth_status().await.is_authenticated);

        auth.login("a@b.co", "pw").await.unwrap();
        let enable = auth.update_biometric_setting(true).await.unwrap();
        assert!(!enable.success);
        let user = auth.credentials().find_user_by_email("a@b.co").await.unwrap();
        assert!(!user.biometric_enabled);
    }

    #[tokio::test]
    async fn test_disable_biometric_requires_session() {
        let (_, auth) = service();
        assert!(!auth.update_biometric_setting(false).await.unwrap().success);

        auth.signup("a@b.co", "pw").await.unwrap();
        let mut users = auth.credentials().get_users().await;
        users[0].biometric_enabled = true;
        auth.credentials().save_users(&users).await.unwrap();

        assert!(auth.update_biometric_setting(false).await.unwrap().success);
        let user = auth.credentials().find_user_by_email("a@b.co").await.unwrap();
        assert!(!user.biometric_enabled);
    }

    #[tokio::test]
    async fn test_disable_biometric_read_failure_keeps_users() {
        let (store, auth) = service();
        auth.signup("a@b.co", "pw").await.unwrap();
        auth.signup("c@d.co", "pw").await.unwrap();

        store.fail_reads(true);
        assert!(!auth.update_biometric_setting(false).await.unwrap().success);
        store.fail_reads(false);
        assert_eq!(auth.credentials().get_users().await.len(), 2);

        let stored = store.memory().get(USERS_KEY).await.unwrap().unwrap();
        store.memory().set(USERS_KEY, "not json").await.unwrap();
        assert!(matches!(
            auth.update_biometric_setting(false).await,
            Err(PostKitError::Storage(StorageError::Serialization(_)))
        ));
        assert_eq!(
            store.memory().get(USERS_KEY).await.unwrap().as_deref(),
            Some("not json")
        );
        store.memory().set(USERS_KEY, &stored).await.unwrap();
        assert!(auth.update_biometric_setting(false).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let (_, auth) = service();
        let mut rx = auth.subscribe();
        assert!(!rx.borrow_and_update().is_authenticated);

        auth.signup("a@b.co", "pw").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated);

        auth.logout().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated);
    }
}
