use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{
    ChirpRecord, ChirpStore, NewChirp, NewRefreshToken, NewUser, RefreshTokenRecord,
    RefreshTokenStore, SortOrder, UserRecord, UserStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    chirps: HashMap<Uuid, ChirpRecord>,
}

/// Process-local store with the same constraints as the Postgres schema
/// (unique email, unique token key, cascading user deletes).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh_token_count(&self) -> usize {
        self.tables.read().await.refresh_tokens.len()
    }

    pub async fn refresh_tokens_for(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.tables
            .read()
            .await
            .refresh_tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn user(&self, user_id: Uuid) -> Option<UserRecord> {
        self.tables.read().await.users.get(&user_id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: now,
            updated_at: now,
            is_chirpy_red: false,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == email && u.id != user_id)
        {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.users.clear();
        tables.refresh_tokens.clear();
        tables.chirps.clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.refresh_tokens.contains_key(&token.token_key) {
            return Err(StoreError::UniqueViolation("refresh_tokens_pkey".to_string()));
        }
        if !tables.users.contains_key(&token.user_id) {
            return Err(StoreError::Query(
                "refresh token owner does not exist".to_string(),
            ));
        }

        tables.refresh_tokens.insert(
            token.token_key.clone(),
            RefreshTokenRecord {
                token_key: token.token_key,
                user_id: token.user_id,
                created_at: token.created_at,
                expires_at: token.expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn get_refresh_token(&self, token_key: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.tables
            .read()
            .await
            .refresh_tokens
            .get(token_key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn revoke_refresh_token(
        &self,
        token_key: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let token = tables
            .refresh_tokens
            .get_mut(token_key)
            .ok_or(StoreError::NotFound)?;
        token.revoked_at = Some(revoked_at);
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, chirp: NewChirp) -> Result<ChirpRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&chirp.user_id) {
            return Err(StoreError::Query("chirp author does not exist".to_string()));
        }

        let now = Utc::now();
        let record = ChirpRecord {
            id: Uuid::new_v4(),
            body: chirp.body,
            user_id: chirp.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.chirps.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_chirps(
        &self,
        author: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<ChirpRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut chirps: Vec<ChirpRecord> = tables
            .chirps
            .values()
            .filter(|c| author.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect();

        chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if order == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<ChirpRecord, StoreError> {
        self.tables
            .read()
            .await
            .chirps
            .get(&chirp_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .chirps
            .remove(&chirp_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store_with_user(email: &str) -> (InMemoryStore, UserRecord) {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser {
                email: email.to_string(),
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (store, _) = store_with_user("a@example.com").await;

        let result = store
            .create_user(NewUser {
                email: "a@example.com".to_string(),
                hashed_password: "other".to_string(),
            })
            .await;

        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_refresh_token_key_rejected() {
        let (store, user) = store_with_user("a@example.com").await;
        let now = Utc::now();
        let token = NewRefreshToken {
            token_key: "key".to_string(),
            user_id: user.id,
            created_at: now,
            expires_at: now + Duration::days(60),
        };

        store.create_refresh_token(token.clone()).await.unwrap();
        let result = store.create_refresh_token(token).await;

        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
        assert_eq!(store.refresh_token_count().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.revoke_refresh_token("missing", Utc::now()).await;
        assert_eq!(result, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let (store, user) = store_with_user("a@example.com").await;
        let now = Utc::now();
        store
            .create_refresh_token(NewRefreshToken {
                token_key: "key".to_string(),
                user_id: user.id,
                created_at: now,
                expires_at: now + Duration::days(60),
            })
            .await
            .unwrap();
        store
            .create_chirp(NewChirp {
                body: "hello".to_string(),
                user_id: user.id,
            })
            .await
            .unwrap();

        store.delete_all_users().await.unwrap();

        assert_eq!(store.refresh_token_count().await, 0);
        assert!(store.list_chirps(None, SortOrder::Asc).await.unwrap().is_empty());
        assert!(store.user(user.id).await.is_none());
    }

    #[tokio::test]
    async fn test_list_chirps_filters_and_sorts() {
        let (store, alice) = store_with_user("alice@example.com").await;
        let bob = store
            .create_user(NewUser {
                email: "bob@example.com".to_string(),
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();

        for (body, user_id) in [("one", alice.id), ("two", bob.id), ("three", alice.id)] {
            store
                .create_chirp(NewChirp {
                    body: body.to_string(),
                    user_id,
                })
                .await
                .unwrap();
        }

        let alice_chirps = store.list_chirps(Some(alice.id), SortOrder::Asc).await.unwrap();
        assert_eq!(alice_chirps.len(), 2);
        assert!(alice_chirps.iter().all(|c| c.user_id == alice.id));

        let asc = store.list_chirps(None, SortOrder::Asc).await.unwrap();
        let desc = store.list_chirps(None, SortOrder::Desc).await.unwrap();
        let reversed: Vec<_> = desc.into_iter().rev().collect();
        assert_eq!(asc, reversed);
    }
}
