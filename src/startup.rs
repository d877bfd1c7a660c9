use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionService;
use crate::clock::Clock;
use crate::configuration::Settings;
use crate::error::{json_error_handler, query_error_handler};
use crate::logger::LoggerMiddleware;
use crate::metrics::{CountHits, HitCounter};
use crate::middleware::BearerAuth;
use crate::profanity::{ProfanityFilter, TextFilter};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::store::Stores;

pub fn run(
    listener: TcpListener,
    stores: Stores,
    settings: Settings,
    clock: Arc<dyn Clock>,
) -> Result<Server, std::io::Error> {
    let session = web::Data::new(SessionService::new(
        &settings.auth,
        stores.users.clone(),
        stores.refresh_tokens.clone(),
        clock,
    ));
    let hits = Arc::new(HitCounter::new());
    let hits_data = web::Data::from(hits.clone());
    let filter: web::Data<dyn TextFilter> =
        web::Data::from(Arc::new(ProfanityFilter::default()) as Arc<dyn TextFilter>);
    let stores = web::Data::new(stores);
    let application = web::Data::new(settings.application.clone());
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(session.clone())
            .app_data(stores.clone())
            .app_data(hits_data.clone())
            .app_data(filter.clone())
            .app_data(application.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/chirps", web::get().to(list_chirps))
            .route("/api/chirps/{chirp_id}", web::get().to(get_chirp))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Protected routes (require an access token)
            .route(
                "/api/users",
                web::put()
                    .to(update_user)
                    .wrap(BearerAuth::new(session.clone())),
            )
            .route(
                "/api/chirps",
                web::post()
                    .to(create_chirp)
                    .wrap(BearerAuth::new(session.clone())),
            )
            .route(
                "/api/chirps/{chirp_id}",
                web::delete()
                    .to(delete_chirp)
                    .wrap(BearerAuth::new(session.clone())),
            )

            // Admin
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Static app, counted
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(hits.clone()))
                    .service(fs::Files::new("/", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
