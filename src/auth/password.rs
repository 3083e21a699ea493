//! Password validation and hashing.
//!
//! [ValidatedPassword] wraps a string that satisfies the password policy and
//! [PasswordHash] turns it into a salted bcrypt hash. Hashing is slow on purpose,
//! so handlers should go through [hash_password] and [verify_password], which
//! run the work on a blocking thread.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The reasons a password is rejected by the password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    /// Fewer than [ValidatedPassword::MIN_LENGTH] characters.
    #[error("Password must be at least 6 characters long")]
    TooShort,
    /// More than [ValidatedPassword::MAX_LENGTH] characters.
    #[error("Password cannot exceed 128 characters")]
    TooLong,
    /// Missing a lower-case letter, an upper-case letter or a digit.
    #[error(
        "Password must contain at least one lowercase letter, one uppercase letter, and one number"
    )]
    MissingCharacterClass,
}

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// The fewest characters a password may have.
    pub const MIN_LENGTH: usize = 6;
    /// The most characters a password may have.
    pub const MAX_LENGTH: usize = 128;

    /// Check `raw_password` against the password policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn new(raw_password: &str) -> Result<Self, PasswordPolicyError> {
        let length = raw_password.chars().count();

        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort);
        }

        if length > Self::MAX_LENGTH {
            return Err(PasswordPolicyError::TooLong);
        }

        let has_lower = raw_password.chars().any(char::is_lowercase);
        let has_upper = raw_password.chars().any(char::is_uppercase);
        let has_digit = raw_password.chars().any(|c| c.is_ascii_digit());

        if !(has_lower && has_upper && has_digit) {
            return Err(PasswordPolicyError::MissingCharacterClass);
        }

        Ok(Self(raw_password.to_owned()))
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// Meant for tests and admin tools that have already checked the password.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The cost used for hashing passwords outside of tests.
    pub const DEFAULT_COST: u32 = 12;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: &ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read from a trusted source such as the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hash `password` on a blocking thread.
pub async fn hash_password(password: ValidatedPassword, cost: u32) -> Result<PasswordHash, Error> {
    tokio::task::spawn_blocking(move || PasswordHash::new(&password, cost))
        .await
        .map_err(|error| Error::HashingError(error.to_string()))?
}

/// Check `raw_password` against `password_hash` on a blocking thread.
pub async fn verify_password(password_hash: PasswordHash, raw_password: String) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || password_hash.verify(&raw_password))
        .await
        .map_err(|error| Error::HashingError(error.to_string()))?
}

#[cfg(test)]
mod validated_password_tests {
    use super::{PasswordPolicyError, ValidatedPassword};

    #[test]
    fn new_fails_on_short_password() {
        assert_eq!(
            ValidatedPassword::new("Ab1"),
            Err(PasswordPolicyError::TooShort)
        );
    }

    #[test]
    fn new_fails_on_long_password() {
        let password = format!("Ab1{}", "x".repeat(126));

        assert_eq!(
            ValidatedPassword::new(&password),
            Err(PasswordPolicyError::TooLong)
        );
    }

    #[test]
    fn new_fails_without_each_character_class() {
        for password in ["alllowercase1", "ALLUPPERCASE1", "NoDigitsHere"] {
            assert_eq!(
                ValidatedPassword::new(password),
                Err(PasswordPolicyError::MissingCharacterClass),
                "accepted {password}"
            );
        }
    }

    #[test]
    fn new_succeeds_on_mixed_password() {
        assert!(ValidatedPassword::new("Secret1").is_ok());
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("Secret1");

        assert_eq!(password.to_string(), "********");
    }
}

#[cfg(test)]
mod password_hash_tests {
    use super::{PasswordHash, ValidatedPassword, hash_password, verify_password};

    #[test]
    fn verify_password_succeeds_for_valid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );

        assert!(hash.verify("okon").unwrap());
        assert!(!hash.verify("thewrongpassword").unwrap());
    }

    #[test]
    fn hash_duplicate_password_produces_unique_hash() {
        let password = ValidatedPassword::new("TurkeysGoGobble1").unwrap();
        let hash = PasswordHash::new(&password, 4).unwrap();
        let dupe_hash = PasswordHash::new(&password, 4).unwrap();

        assert_ne!(hash, dupe_hash);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hash = PasswordHash::new_unchecked("not a bcrypt hash");

        assert!(hash.verify("okon").is_err());
    }

    #[tokio::test]
    async fn hashing_on_blocking_thread_produces_verifiable_hash() {
        let password = ValidatedPassword::new("RoostersCrow1").unwrap();

        let hash = hash_password(password, 4).await.unwrap();

        assert!(verify_password(hash.clone(), "RoostersCrow1".to_owned()).await.unwrap());
        assert!(!verify_password(hash, "roosterscrow1".to_owned()).await.unwrap());
    }
}
