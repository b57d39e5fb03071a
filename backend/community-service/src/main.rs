use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use community_service::handlers;
use community_service::metrics;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use session_auth::SessionAuthMiddleware;
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "community-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "community-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

/// Community Service
///
/// Serves the Arunika social surface: posts, comments, likes, and follows,
/// plus the live-update event stream for open discussion threads.
///
/// # Routes
///
/// - `/api/v1/live` - Server-sent events for one thread (query: `post_id`)
/// - `/api/v1/posts/*` - Posts, their comments, and their likes
/// - `/api/v1/comments/*` - Comment deletion
/// - `/api/v1/users/*` - Follow graph
///
/// The service runs on port 8081 (configurable via COMMUNITY_SERVICE_PORT).
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match community_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting community-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool (standardized)
    let mut db_cfg = DbPoolConfig::for_service("community-service");
    db_cfg.database_url = config.database.url.clone();
    if db_cfg.max_connections < config.database.max_connections {
        db_cfg.max_connections = config.database.max_connections;
    }

    db_cfg.log_config();
    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // The community and try-on surfaces share one database; each service
    // only applies its own migration files.
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;

    tracing::info!("Connected to database via db-pool crate");

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let db_pool_http = db_pool.clone();
    let config_http = config.clone();

    let server = HttpServer::new(move || {
        // Build CORS configuration
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
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            // The event stream carries only public thread content
            .route(
                "/api/v1/live",
                web::get().to(handlers::stream_thread_updates),
            )
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/posts")
                            .wrap(auth.clone())
                            .service(
                                web::resource("").route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/user/{user_id}")
                                    .route(web::get().to(handlers::get_user_posts)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::delete().to(handlers::delete_post)),
                            )
                            .service(
                                web::resource("/{post_id}/comments")
                                    .route(web::get().to(handlers::get_post_comments))
                                    .route(web::post().to(handlers::create_comment)),
                            )
                            .service(
                                web::resource("/{post_id}/likes")
                                    .route(web::get().to(handlers::get_post_likes))
                                    .route(web::post().to(handlers::like_post))
                                    .route(web::delete().to(handlers::unlike_post)),
                            ),
                    )
                    .service(
                        web::scope("/comments").wrap(auth.clone()).service(
                            web::resource("/{comment_id}")
                                .route(web::delete().to(handlers::delete_comment)),
                        ),
                    )
                    .service(
                        web::scope("/users")
                            .wrap(auth)
                            .route("/{user_id}/follow", web::post().to(handlers::follow_user))
                            .route(
                                "/{user_id}/follow",
                                web::delete().to(handlers::unfollow_user),
                            )
                            .route(
                                "/{user_id}/followers",
                                web::get().to(handlers::get_followers),
                            )
                            .route(
                                "/{user_id}/following",
                                web::get().to(handlers::get_following),
                            ),
                    ),
            )
    })
    .bind(&http_bind_address)?
    .workers(4)
    .run();

    tracing::info!("HTTP server is running");
    server.await
}
