use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::configuration::{ApplicationSettings, Platform};
use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::store::Stores;

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        counter.hits()
    ))
}

/// POST /admin/reset
///
/// Deletes every user (and with them all chirps and refresh tokens) and
/// zeroes the hit counter. Only allowed on the dev platform.
pub async fn reset(
    settings: web::Data<ApplicationSettings>,
    counter: web::Data<HitCounter>,
    stores: web::Data<Stores>,
) -> Result<HttpResponse, AppError> {
    if settings.platform != Platform::Dev {
        return Err(AppError::Forbidden(
            "reset is only allowed in dev".to_string(),
        ));
    }

    stores.users.delete_all_users().await?;
    counter.reset();
    tracing::warn!("Database and hit counter reset");

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hits reset to 0 and database reset to initial state."))
}
