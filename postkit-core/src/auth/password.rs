//! Password digest policy.
//!
//! Passwords are stored as an unsalted single-round SHA-256 digest, lowercase
//! hex encoded, matching the records already persisted on devices.
//! TODO: move to a salted KDF (argon2) with a per-record scheme tag and
//! rehash on successful login.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Computes the stored digest for `password`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Checks `password` against a stored digest in constant time.
#[must_use]
pub fn verify_password(password: &str, stored_digest: &str) -> bool {
    let computed = hash_password(password);
    computed.as_bytes().ct_eq(stored_digest.as_bytes()).into()
}
