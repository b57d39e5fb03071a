//! Session authentication middleware for Arunika Actix services
//!
//! Authentication itself is delegated to the external auth provider, which
//! owns the `users` and `sessions` tables. This middleware only resolves a
//! `Authorization: Bearer <session token>` header to a user id by reading
//! the provider's session rows, and stores the result in request extensions
//! for handlers to extract via [`UserId`].

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use sqlx::{PgPool, Row};
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

/// Actix middleware that resolves a bearer session token against the
/// auth provider's session store.
#[derive(Clone)]
pub struct SessionAuthMiddleware {
    pool: PgPool,
}

impl SessionAuthMiddleware {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
    pool: PgPool,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
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
        let service = self.service.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("Missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| ErrorUnauthorized("Invalid Authorization scheme"))?;

            let user_id = resolve_session(&pool, token)
                .await
                .map_err(|e| {
                    tracing::error!("Session lookup failed: {}", e);
                    ErrorUnauthorized("Session lookup failed")
                })?
                .ok_or_else(|| ErrorUnauthorized("Invalid or expired session"))?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

/// Resolve a session token to a user id, honoring session expiry.
///
/// Returns `Ok(None)` for unknown or expired tokens. The session row is
/// never written here; the auth provider owns its lifecycle.
async fn resolve_session(pool: &PgPool, token: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT user_id, expires_at
        FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: DateTime<Utc> = row.get("expires_at");
    if expires_at <= Utc::now() {
        return Ok(None);
    }

    Ok(Some(row.get::<Uuid, _>("user_id")))
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("User ID missing")),
        )
    }
}
