/// Persistence collaborators
///
/// The credential subsystem talks to storage only through these traits.
/// `PgStore` is the production implementation, `InMemoryStore` backs tests
/// and local runs.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreError;

/// A user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
}

/// A refresh token row, keyed by the digest of the token value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_key: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token_key: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A chirp row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChirp {
    pub body: String,
    pub user_id: Uuid,
}

/// Listing order by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `StoreError::UniqueViolation` if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    async fn update_user_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError>;

    /// Sets the premium flag; `StoreError::NotFound` for an unknown user
    async fn upgrade_user(&self, user_id: Uuid) -> Result<(), StoreError>;

    /// Removes every user and, by cascade, their chirps and refresh tokens
    async fn delete_all_users(&self) -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// `StoreError::UniqueViolation` if the key already exists
    async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<(), StoreError>;

    async fn get_refresh_token(&self, token_key: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// Sets `revoked_at`; `StoreError::NotFound` if no row matches
    async fn revoke_refresh_token(
        &self,
        token_key: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<ChirpRecord, StoreError>;

    async fn list_chirps(
        &self,
        author: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<ChirpRecord>, StoreError>;

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<ChirpRecord, StoreError>;

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<(), StoreError>;
}

/// The three collaborators, shared across workers
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub chirps: Arc<dyn ChirpStore>,
}

impl Stores {
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            chirps: store,
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            chirps: store,
        }
    }
}
