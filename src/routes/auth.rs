/// Authentication Routes
///
/// Login, access token refresh, and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{authorization_header, bearer_token, SessionService};
use crate::error::{AppError, AuthError};
use crate::routes::users::UserResponse;
use crate::validators::normalize_email;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the public profile plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// New access token
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// The bearer credential of a request, owned
pub(crate) fn presented_bearer(req: &HttpRequest) -> Result<String, AppError> {
    let header =
        authorization_header(req.headers()).map_err(|_| AppError::Auth(AuthError::TokenInvalid))?;
    bearer_token(header).map(str::to_string)
}

/// POST /api/login
///
/// The email is only normalized here: an address that could never have been
/// registered is just another unknown email.
///
/// # Errors
/// - 400: Malformed body
/// - 401: Unknown email or wrong password
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let email = normalize_email(&form.email);

    let outcome = session.login(&email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(outcome.user),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Takes the refresh token as `Authorization: Bearer <refresh_token>` and
/// returns a new access token. The refresh token is not rotated.
///
/// # Errors
/// - 401: Missing header, or unknown, expired or revoked refresh token
/// - 500: Internal server error
pub async fn refresh(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = presented_bearer(&req)?;

    let token = session.refresh(&refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revokes the refresh token given as `Authorization: Bearer <refresh_token>`.
///
/// # Errors
/// - 401: Missing or malformed header
/// - 500: Token was never issued, or internal error
pub async fn revoke(
    req: HttpRequest,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = presented_bearer(&req)?;

    session.revoke(&refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
