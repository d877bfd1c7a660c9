/// User Routes
///
/// Account creation and credential updates.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::middleware::AuthenticatedUser;
use crate::error::AppError;
use crate::store::{NewUser, Stores, UserRecord};
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

/// Public user profile (never includes the password hash)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Validate credentials and hash the password off the async executor
async fn prepare_credentials(form: &UserCredentials) -> Result<(String, String), AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    let password = form.password.clone();
    let hashed_password = web::block(move || hash_password(&password)).await??;

    Ok((email, hashed_password))
}

/// POST /api/users
///
/// # Errors
/// - 400: Malformed body, email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<UserCredentials>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let (email, hashed_password) = prepare_credentials(&form).await?;

    let user = stores
        .users
        .create_user(NewUser {
            email,
            hashed_password,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces the caller's email and password.
///
/// # Errors
/// - 400: Malformed body, email or password
/// - 401: Missing or invalid access token (middleware)
/// - 409: Email taken by another account
pub async fn update_user(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<UserCredentials>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let (email, hashed_password) = prepare_credentials(&form).await?;

    let user = stores
        .users
        .update_user_credentials(caller.user_id, &email, &hashed_password)
        .await?;

    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
