/// Bearer Authentication Middleware
///
/// Runs the session gate on the `Authorization` header before the wrapped
/// handler. On success the caller's id is stored in the request extensions
/// as `AuthenticatedUser`; on failure the handler never runs.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{authorization_header, SessionService};
use crate::error::{AppError, AuthError};

/// The user a verified access token speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Middleware for routes that require an access token
pub struct BearerAuth {
    session: web::Data<SessionService>,
}

impl BearerAuth {
    pub fn new(session: web::Data<SessionService>) -> Self {
        Self { session }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(BearerAuthService {
            service: Rc::new(service),
            session: self.session.clone(),
        }))
    }
}

pub struct BearerAuthService<S> {
    service: Rc<S>,
    session: web::Data<SessionService>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = authorization_header(req.headers())
            .map_err(|_| AppError::Auth(AuthError::TokenInvalid))
            .and_then(|header| self.session.authorize(header));

        match verified {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser { user_id });
                tracing::debug!(user_id = %user_id, "Access token verified");

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err::<ServiceResponse<B>, Error>(e.into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::configuration::AuthSettings;
    use crate::store::InMemoryStore;
    use actix_web::{test, App, HttpResponse};
    use std::sync::Arc;

    fn session() -> SessionService {
        let store = Arc::new(InMemoryStore::new());
        let settings = AuthSettings {
            jwt_secret: "middleware-test-secret".to_string(),
            issuer: "chirpy-access".to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_days: 60,
            polka_key: "key".to_string(),
        };
        SessionService::new(&settings, store.clone(), store, Arc::new(ManualClock::default()))
    }

    async fn whoami(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let session = web::Data::new(session());
        let user_id = Uuid::new_v4();
        let token = session.issue_access_token(user_id).unwrap();
        let app = test::init_service(
            App::new().route(
                "/whoami",
                web::get().to(whoami).wrap(BearerAuth::new(session.clone())),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn test_missing_or_bad_token_is_401() {
        let session = web::Data::new(session());
        let app = test::init_service(
            App::new().route(
                "/whoami",
                web::get().to(whoami).wrap(BearerAuth::new(session.clone())),
            ),
        )
        .await;

        for header in [None, Some("Bearer invalid.token.here"), Some("Basic dXNlcjpwYXNz")] {
            let mut req = test::TestRequest::get().uri("/whoami");
            if let Some(value) = header {
                req = req.insert_header(("Authorization", value));
            }
            let err = test::try_call_service(&app, req.to_request())
                .await
                .err()
                .expect("request should be rejected");

            assert_eq!(
                err.as_response_error().status_code().as_u16(),
                401,
                "header: {:?}",
                header
            );
        }
    }
}
