//! Local authentication: user records, password digests, session marker and
//! biometric capability probing.
//!
//! [`AuthService`] is the entry point. It persists through a
//! [`CredentialStore`] which in turn sits on any
//! [`KeyValueStore`](crate::storage::KeyValueStore); hosts should back it with
//! secure storage such as a [`SealedStore`](crate::storage::SealedStore).

mod biometric;
mod credential_store;
mod password;
mod service;
mod user;

pub use biometric::{
    BiometricAuthenticator, BiometricAvailability, BiometricKind, BiometricProbeError,
    NoBiometrics, BIOMETRIC_NOT_SUPPORTED_MESSAGE, GENERIC_BIOMETRIC_LABEL,
};
pub use credential_store::CredentialStore;
pub use password::{hash_password, verify_password};
pub use service::{AuthService, AuthStatus, BiometricOutcome, SignupOutcome};
pub use user::{is_valid_email, normalize_email, User};
