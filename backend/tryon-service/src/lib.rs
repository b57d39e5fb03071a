/// Try-On Service Library
///
/// Lets users try on traditional Indonesian garments by routing their photo
/// through external image-generation providers. Every outbound generation
/// request is load-balanced across the registered provider credentials by
/// the credential rotator. Also serves the garment catalog, voice narration
/// for province content, and presigned photo uploads.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for credentials and garments
/// - `services`: Credential rotation, garment cache, object storage
/// - `providers`: Clients for the external generation APIs
/// - `db`: Database access layer and repositories
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
