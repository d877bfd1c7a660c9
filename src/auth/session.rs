/// Session flows: login, refresh, revoke, and the request gates
///
/// Component errors are logged here with their precise kind and then mapped
/// to what the caller may see (mostly a bare 401).

use actix_web::web;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::credentials::{api_keys_match, extract_api_key, extract_bearer};
use crate::auth::jwt::AccessTokenSigner;
use crate::auth::password::verify_password;
use crate::auth::refresh_token::RefreshTokenManager;
use crate::clock::Clock;
use crate::configuration::AuthSettings;
use crate::error::{
    AccessTokenError, AppError, AuthError, CredentialError, RefreshTokenError, StoreError,
};
use crate::store::{RefreshTokenStore, UserRecord, UserStore};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenManager,
    signer: AccessTokenSigner,
    access_token_ttl: Duration,
    polka_key: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(
        settings: &AuthSettings,
        users: Arc<dyn UserStore>,
        refresh_token_store: Arc<dyn RefreshTokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens: RefreshTokenManager::new(
                refresh_token_store,
                clock.clone(),
                settings.refresh_token_ttl(),
            ),
            signer: AccessTokenSigner::new(&settings.jwt_secret, settings.issuer.clone()),
            access_token_ttl: settings.access_token_ttl(),
            polka_key: Arc::from(settings.polka_key.as_str()),
            clock,
        }
    }

    /// Check email and password, then issue an access and a refresh token
    ///
    /// Unknown email and wrong password produce the same error. No refresh
    /// token is stored unless the password matched.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.users.get_user_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                tracing::info!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(AppError::Store(e)),
        };

        let candidate = password.to_string();
        let stored_hash = user.hashed_password.clone();
        let password_valid =
            web::block(move || verify_password(&candidate, &stored_hash)).await??;

        if !password_valid {
            tracing::info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.issue_access_token(user.id)?;
        let refresh_token = self
            .refresh_tokens
            .issue(user.id)
            .await
            .map_err(refresh_token_failure)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is left untouched and stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let user_id = self
            .refresh_tokens
            .resolve(refresh_token)
            .await
            .map_err(refresh_token_failure)?;

        let access_token = self.issue_access_token(user_id)?;
        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token
    ///
    /// Already-revoked tokens are acknowledged; a token that was never issued
    /// is a server error.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        match self.refresh_tokens.revoke(refresh_token).await {
            Ok(()) => Ok(()),
            Err(RefreshTokenError::NotFound) => Err(AppError::Internal(
                "revoke requested for unknown refresh token".to_string(),
            )),
            Err(e) => Err(refresh_token_failure(e)),
        }
    }

    /// Gate for protected actions: bearer access token in, user id out
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Uuid, AppError> {
        let token = bearer_token(authorization)?;

        self.signer
            .verify(token, self.clock.now())
            .map_err(|e| {
                tracing::warn!(error = %e, "Access token rejected");
                match e {
                    AccessTokenError::Expired => AuthError::TokenExpired.into(),
                    AccessTokenError::InvalidSignature | AccessTokenError::Malformed(_) => {
                        AuthError::TokenInvalid.into()
                    }
                    AccessTokenError::Signing(msg) => AppError::Internal(msg),
                }
            })
    }

    /// Gate for the payment provider webhook
    pub fn authorize_webhook(&self, authorization: Option<&str>) -> Result<(), AppError> {
        let key = extract_api_key(authorization).map_err(credential_failure)?;

        if !api_keys_match(key, &self.polka_key) {
            tracing::warn!("Webhook called with a wrong API key");
            return Err(AuthError::TokenInvalid.into());
        }
        Ok(())
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.signer
            .issue(user_id, self.access_token_ttl, self.clock.now())
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Pull the bearer credential out of an `Authorization` header value
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AppError> {
    extract_bearer(authorization).map_err(credential_failure)
}

fn credential_failure(e: CredentialError) -> AppError {
    tracing::debug!(error = %e, "Credential extraction failed");
    match e {
        CredentialError::MissingHeader => AuthError::MissingToken.into(),
        CredentialError::MalformedHeader => AuthError::TokenInvalid.into(),
    }
}

fn refresh_token_failure(e: RefreshTokenError) -> AppError {
    match e {
        RefreshTokenError::NotFound | RefreshTokenError::Revoked => {
            tracing::warn!(reason = %e, "Refresh token rejected");
            AuthError::TokenInvalid.into()
        }
        RefreshTokenError::Expired => {
            tracing::info!(reason = %e, "Refresh token rejected");
            AuthError::TokenExpired.into()
        }
        RefreshTokenError::Collision | RefreshTokenError::ExpiryOutOfRange => {
            AppError::Internal(e.to_string())
        }
        RefreshTokenError::Store(store_err) => AppError::Store(store_err),
    }
}
