/// Chirp Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::profanity::TextFilter;
use crate::store::{ChirpRecord, NewChirp, SortOrder, Stores};
use crate::validators::is_valid_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<ChirpRecord> for ChirpResponse {
    fn from(chirp: ChirpRecord) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

/// POST /api/chirps
///
/// # Errors
/// - 400: Empty body or longer than 140 characters
/// - 401: Missing or invalid access token (middleware)
pub async fn create_chirp(
    caller: web::ReqData<AuthenticatedUser>,
    form: web::Json<CreateChirpRequest>,
    stores: web::Data<Stores>,
    filter: web::Data<dyn TextFilter>,
) -> Result<HttpResponse, AppError> {
    is_valid_chirp_body(&form.body)?;

    let chirp = stores
        .chirps
        .create_chirp(NewChirp {
            body: filter.filter_text(&form.body),
            user_id: caller.user_id,
        })
        .await?;

    Ok(HttpResponse::Created().json(ChirpResponse::from(chirp)))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let chirps = stores
        .chirps
        .list_chirps(query.author_id, query.sort)
        .await?;

    let body: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let chirp = stores.chirps.get_chirp(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ChirpResponse::from(chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token (middleware)
/// - 403: Caller is not the author
/// - 404: No such chirp
pub async fn delete_chirp(
    caller: web::ReqData<AuthenticatedUser>,
    path: web::Path<Uuid>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    let chirp = stores.chirps.get_chirp(path.into_inner()).await?;

    if chirp.user_id != caller.user_id {
        tracing::warn!(chirp_id = %chirp.id, user_id = %caller.user_id, "Refused to delete another user's chirp");
        return Err(AppError::Forbidden("chirp belongs to another user".to_string()));
    }

    stores.chirps.delete_chirp(chirp.id).await?;

    Ok(HttpResponse::NoContent().finish())
}
