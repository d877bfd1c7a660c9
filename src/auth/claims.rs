/// JWT Claims structure
///
/// Payload of an access token: subject, issuance, expiry and issuer
/// (RFC 7519 registered claims only).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AccessTokenError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims issued at `issued_at` and valid for `ttl`
    pub fn new(user_id: Uuid, issued_at: DateTime<Utc>, ttl: Duration, issuer: &str) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: user_id.to_string(),
            exp: iat + ttl.num_seconds(),
            iat,
            iss: issuer.to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns error if the subject is not a valid UUID
    pub fn user_id(&self) -> Result<Uuid, AccessTokenError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AccessTokenError::Malformed("subject is not a user id".to_string()))
    }

    /// Expired once `now` reaches `exp`; there is no grace window
    ///
    /// Both sides are whole seconds, so a token can expire up to one second
    /// before `issued_at + ttl`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
