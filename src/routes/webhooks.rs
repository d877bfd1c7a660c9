/// Payment provider webhooks

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{authorization_header, SessionService};
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::Stores;

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// The key is checked before the body is parsed, so a caller without the
/// key learns nothing about the payload format.
///
/// # Errors
/// - 401: Missing or wrong `ApiKey`
/// - 400: Malformed body
/// - 404: `user.upgraded` for an unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    session: web::Data<SessionService>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let header =
        authorization_header(req.headers()).map_err(|_| AppError::Auth(AuthError::TokenInvalid))?;
    session.authorize_webhook(header)?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    if event.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let data = event.data.ok_or_else(|| {
        ValidationError::MalformedBody("missing data.user_id".to_string())
    })?;

    stores.users.upgrade_user(data.user_id).await?;
    tracing::info!(user_id = %data.user_id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
