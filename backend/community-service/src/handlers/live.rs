/// Live-update stream handler
///
/// Opens a long-lived `text/event-stream` response scoped to one post. The
/// post id arrives as a query parameter; a missing or malformed id is
/// rejected with a 400 JSON body before any stream is opened.
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::{LiveUpdateFeed, PgThreadStore};
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct LiveQuery {
    pub post_id: Option<Uuid>,
}

/// Open a live-update stream for one discussion thread
pub async fn stream_thread_updates(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<LiveQuery>,
) -> Result<HttpResponse> {
    let post_id = query.post_id.ok_or_else(|| {
        AppError::BadRequest("post_id query parameter is required".to_string())
    })?;

    metrics::LIVE_SESSIONS_OPENED.inc();
    tracing::debug!(%post_id, "live update session opened");

    let feed = LiveUpdateFeed::new(
        PgThreadStore::new((**pool).clone()),
        post_id,
        Duration::from_secs(config.live.poll_interval_secs),
        config.live.batch_size,
    );

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONNECTION, "keep-alive"))
        .streaming(feed.into_stream()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use sqlx::postgres::PgPoolOptions;

    fn test_config() -> Config {
        Config {
            app: crate::config::AppConfig {
                env: "test".to_string(),
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            cors: crate::config::CorsConfig {
                allowed_origins: "*".to_string(),
            },
            database: crate::config::DatabaseConfig {
                url: "postgres://localhost/arunika-test".to_string(),
                max_connections: 1,
            },
            live: crate::config::LiveConfig {
                poll_interval_secs: 10,
                batch_size: 3,
            },
        }
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/arunika-test")
            .expect("lazy pool")
    }

    #[actix_web::test]
    async fn missing_post_id_is_rejected_before_streaming() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(test_config()))
                .route("/api/v1/live", web::get().to(stream_thread_updates)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/live").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn malformed_post_id_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(test_config()))
                .route("/api/v1/live", web::get().to(stream_thread_updates)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/live?post_id=not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
