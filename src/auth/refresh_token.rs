/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS CSPRNG, hex encoded (256 bits of entropy)
/// - Stored as their SHA-256 digest (the plaintext never reaches the store)
/// - Valid until they expire or are revoked; a revoked row stays as a tombstone
/// - Not rotated on refresh

use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{RefreshTokenError, StoreError};
use crate::store::{NewRefreshToken, RefreshTokenStore};

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Storage key for a refresh token
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn RefreshTokenStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Issue and persist a refresh token for `owner`
    ///
    /// # Errors
    /// - `Collision` if the store already holds the generated value; this is
    ///   never retried
    /// - `Store` if persistence fails
    pub async fn issue(&self, owner: Uuid) -> Result<String, RefreshTokenError> {
        let token = generate_refresh_token();
        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or(RefreshTokenError::ExpiryOutOfRange)?;

        self.store
            .create_refresh_token(NewRefreshToken {
                token_key: hash_token(&token),
                user_id: owner,
                created_at,
                expires_at,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(_) => {
                    tracing::error!(user_id = %owner, "Refresh token collision, check the entropy source");
                    RefreshTokenError::Collision
                }
                other => RefreshTokenError::Store(other),
            })?;

        tracing::debug!(user_id = %owner, "Refresh token issued");
        Ok(token)
    }

    /// Resolve a live refresh token to its owner
    ///
    /// # Errors
    /// `NotFound`, `Expired` (checked first) or `Revoked`; `Store` on
    /// persistence failure
    pub async fn resolve(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let record = self
            .store
            .get_refresh_token(&hash_token(token))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => RefreshTokenError::NotFound,
                other => RefreshTokenError::Store(other),
            })?;

        if self.clock.now() >= record.expires_at {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(RefreshTokenError::Expired);
        }

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(RefreshTokenError::Revoked);
        }

        Ok(record.user_id)
    }

    /// Revoke a refresh token; revoking twice is not an error
    ///
    /// # Errors
    /// `NotFound` for a token that was never issued
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        self.store
            .revoke_refresh_token(&hash_token(token), self.clock.now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => RefreshTokenError::NotFound,
                other => RefreshTokenError::Store(other),
            })
    }
}
