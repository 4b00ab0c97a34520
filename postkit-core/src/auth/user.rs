//! Registered user records and email helpers.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A locally registered user.
///
/// Serialized with the field names `email`, `hashedPassword` and
/// `biometricEnabled`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Normalized email, unique across records.
    pub email: String,
    /// Lowercase hex password digest.
    pub hashed_password: String,
    /// Whether biometric sign-in is enabled for this user.
    #[serde(default)]
    pub biometric_enabled: bool,
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Normalizes an email for use as a user key: trims and lowercases.
///
/// The auth service compares emails exactly; callers normalize first.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns whether `email` looks deliverable.
///
/// Accepts an RFC 5322 style local part and a dot-separated domain whose
/// last label has at least two characters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if !EMAIL_PATTERN.is_match(email) {
        return false;
    }
    email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit('.').next())
        .is_some_and(|tld| tld.len() >= 2)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test_case("alice@example.com", true ; "simple")]
    #[test_case("a.b+tag@mail.example.co", true ; "subdomain and tag")]
    #[test_case("o'neil@example.io", true ; "apostrophe")]
    #[test_case("alice@example.c", false ; "one letter tld")]
    #[test_case("alice@localhost", true ; "single label domain")]
    #[test_case("alice.example.com", false ; "missing at")]
    #[test_case("alice@-example.com", false ; "leading hyphen label")]
    #[test_case("al ice@example.com", false ; "space in local part")]
    #[test_case("", false ; "empty")]
    fn test_is_valid_email(email: &str, expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    #[test]
    fn test_record_json_field_names() {
        let user = User {
            email: "a@b.co".to_string(),
            hashed_password: "00".to_string(),
            biometric_enabled: false,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["hashedPassword"], "00");
        assert_eq!(json["biometricEnabled"], false);
    }
}
