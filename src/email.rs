use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

/// The error returned for a string that is not a valid email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0} is not a valid email address")]
pub struct EmailAddressError(pub String);

/// An email address, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Validate `raw_email` and normalize it.
    ///
    /// Surrounding whitespace is ignored and the address is lower-cased, so
    /// "Alice@Example.com " and "alice@example.com" are the same account.
    ///
    /// # Errors
    ///
    /// This function will return an error if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, EmailAddressError> {
        let email = raw_email.trim().to_lowercase();

        if EmailAddress::is_valid(&email) {
            Ok(Self(email))
        } else {
            Err(EmailAddressError(raw_email.to_owned()))
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// Only for addresses read back from the database.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }

    /// The address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
