/// Configuration management for Community Service
///
/// This module handles loading and managing configuration from environment
/// variables.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Live-update stream configuration
    pub live: LiveConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Live-update stream configuration
///
/// One poll cycle runs per tick per open connection; the batch size bounds
/// the payload of a single emitted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Seconds between poll ticks
    pub poll_interval_secs: u64,
    /// Maximum comments (and, independently, likes) returned per tick
    pub batch_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("COMMUNITY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("COMMUNITY_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8081),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/arunika".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            live: LiveConfig {
                poll_interval_secs: std::env::var("LIVE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                batch_size: std::env::var("LIVE_BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_defaults() {
        std::env::remove_var("APP_ENV");
        std::env::remove_var("COMMUNITY_SERVICE_PORT");
        std::env::remove_var("LIVE_POLL_INTERVAL_SECS");
        std::env::remove_var("LIVE_BATCH_SIZE");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8081);
        assert_eq!(config.live.poll_interval_secs, 10);
        assert_eq!(config.live.batch_size, 3);
    }

    #[test]
    #[serial_test::serial]
    fn test_live_overrides() {
        std::env::remove_var("APP_ENV");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
        std::env::set_var("LIVE_POLL_INTERVAL_SECS", "2");
        std::env::set_var("LIVE_BATCH_SIZE", "10");

        let config = Config::from_env().unwrap();
        assert_eq!(config.live.poll_interval_secs, 2);
        assert_eq!(config.live.batch_size, 10);

        std::env::remove_var("LIVE_POLL_INTERVAL_SECS");
        std::env::remove_var("LIVE_BATCH_SIZE");
    }

    #[test]
    #[serial_test::serial]
    fn test_production_requires_cors_origins() {
        std::env::set_var("APP_ENV", "production");
        std::env::remove_var("CORS_ALLOWED_ORIGINS");

        assert!(Config::from_env().is_err());

        std::env::remove_var("APP_ENV");
    }
}
