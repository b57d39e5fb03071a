/// Configuration management for Try-On Service
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
    /// Object storage configuration
    pub s3: S3Config,
    /// External provider configuration
    pub providers: ProvidersConfig,
    /// Garment cache configuration
    pub cache: CacheConfig,
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

/// Object storage configuration (user photo uploads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Base URL under which uploaded objects are publicly reachable
    pub public_base_url: String,
}

/// External provider configuration
///
/// Per-account secrets for the image-generation providers live in the
/// credential pool (database), not here. This only carries the model names
/// and the single-account voice provider key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub gemini_model: String,
    pub qwen_model: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_voice_id: String,
    /// Timeout for outbound generation requests
    pub request_timeout_secs: u64,
}

/// Garment cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a garment lookup stays cached
    pub garment_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("TRYON_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("TRYON_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8082),
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
                    .unwrap_or(5),
            },
            s3: S3Config {
                bucket: std::env::var("S3_BUCKET").unwrap_or_default(),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-1".to_string()),
                public_base_url: std::env::var("S3_PUBLIC_BASE_URL").unwrap_or_default(),
            },
            providers: ProvidersConfig {
                gemini_model: std::env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash-image-preview".to_string()),
                qwen_model: std::env::var("QWEN_MODEL")
                    .unwrap_or_else(|_| "qwen-image-edit".to_string()),
                elevenlabs_api_key: std::env::var("ELEVENLABS_API_KEY").ok(),
                elevenlabs_voice_id: std::env::var("ELEVENLABS_VOICE_ID")
                    .unwrap_or_else(|_| "21m00Tcm4TlvDq8ikWAM".to_string()),
                request_timeout_secs: std::env::var("PROVIDER_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
            cache: CacheConfig {
                garment_ttl_secs: std::env::var("GARMENT_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
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
        std::env::remove_var("CORS_ALLOWED_ORIGINS");
        std::env::remove_var("TRYON_SERVICE_PORT");
        std::env::remove_var("GEMINI_MODEL");
        std::env::remove_var("GARMENT_CACHE_TTL_SECS");
        std::env::remove_var("PROVIDER_REQUEST_TIMEOUT_SECS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 8082);
        assert_eq!(config.providers.gemini_model, "gemini-2.5-flash-image-preview");
        assert_eq!(config.providers.request_timeout_secs, 60);
        assert_eq!(config.cache.garment_ttl_secs, 300);
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
