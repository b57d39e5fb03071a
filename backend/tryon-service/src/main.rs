/// Try-On Service - HTTP Server
///
/// Routes virtual try-on requests through external image-generation
/// providers, balancing load across the registered credential pool.
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use session_auth::SessionAuthMiddleware;
use std::io;
use std::time::Duration;
use tryon_service::handlers::{self, TryOnState};
use tryon_service::metrics;
use tryon_service::providers::{ElevenLabsClient, GeminiClient, QwenClient, WardrobeClient};
use tryon_service::services::{CredentialRotator, GarmentCache, PgCredentialStore};
use tryon_service::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting tryon-service v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database connection pool
    let mut db_cfg = DbPoolConfig::for_service("tryon-service");
    db_cfg.database_url = config.database.url.clone();
    db_cfg.log_config();

    let db_pool = create_pg_pool(db_cfg)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Database pool failed: {e}")))?;

    // The community and try-on surfaces share one database; each service
    // only applies its own migration files.
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;

    // Object storage client for presigned uploads
    let region = aws_sdk_s3::config::Region::new(config.s3.region.clone());
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    let s3_client = aws_sdk_s3::Client::new(&sdk_config);

    let timeout = Duration::from_secs(config.providers.request_timeout_secs);
    let state = web::Data::new(TryOnState {
        rotator: CredentialRotator::new(PgCredentialStore::new(db_pool.clone())),
        gemini: GeminiClient::new(config.providers.gemini_model.clone(), timeout),
        qwen: QwenClient::new(config.providers.qwen_model.clone(), timeout),
        wardrobe: WardrobeClient::new(timeout),
        elevenlabs: ElevenLabsClient::new(timeout),
        garment_cache: GarmentCache::new(Duration::from_secs(config.cache.garment_ttl_secs)),
    });

    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let db_pool_http = db_pool.clone();
    let config_http = config.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config_http.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let auth = SessionAuthMiddleware::new(db_pool_http.clone());

        App::new()
            .app_data(web::Data::new(db_pool_http.clone()))
            .app_data(web::Data::new(config_http.clone()))
            .app_data(web::Data::new(s3_client.clone()))
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .route(
                "/api/v1/health/ready",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/api/v1/health/live",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            // The garment catalog is public; try-on, voice, and uploads
            // require a session.
            .service(
                web::scope("/api/v1/garments")
                    .route("", web::get().to(handlers::list_garments))
                    .route("/{garment_id}", web::get().to(handlers::get_garment)),
            )
            .service(
                web::scope("/api/v1/tryon")
                    .wrap(auth.clone())
                    .route("/gemini", web::post().to(handlers::tryon_gemini))
                    .route("/qwen", web::post().to(handlers::tryon_qwen))
                    .route("/wardrobe", web::post().to(handlers::tryon_wardrobe)),
            )
            .service(
                web::scope("/api/v1/voice")
                    .wrap(auth.clone())
                    .route("/narrate", web::post().to(handlers::narrate)),
            )
            .service(
                web::scope("/api/v1/uploads")
                    .wrap(auth)
                    .route("/presign", web::post().to(handlers::presign_upload)),
            )
    })
    .bind(&http_bind_address)?
    .run()
    .await
}
