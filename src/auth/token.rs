//! Issues and verifies the signed session tokens sent as bearer tokens.

use std::fmt::Debug;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::UserID};

/// The contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token was signed by us but is past its expiry.
    #[error("the token has expired")]
    Expired,
    /// The token is malformed, has a bad signature or unexpected claims.
    #[error("the token is invalid")]
    Invalid,
}

impl From<TokenError> for Error {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Expired => Error::ExpiredToken,
            TokenError::Invalid => Error::InvalidToken,
        }
    }
}

/// Signs and checks HS256 session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenManager {
    /// Create a token manager that signs with `secret` and issues tokens valid for `lifetime`.
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// How long issued tokens stay valid.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `user_id` that starts now.
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue(&self, user_id: UserID) -> Result<String, Error> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issue a token for `user_id` as if it were `issued_at`.
    pub fn issue_at(&self, user_id: UserID, issued_at: OffsetDateTime) -> Result<String, Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.lifetime).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check the signature and expiry of `token` and return the user it was issued to.
    pub fn verify(&self, token: &str) -> Result<UserID, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        claims
            .sub
            .parse()
            .map(UserID::new)
            .map_err(|_| TokenError::Invalid)
    }
}

impl Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
