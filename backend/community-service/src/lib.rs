/// Community Service Library
///
/// Handles posts, comments, likes, and follows for the Arunika cultural
/// community, plus the live-update stream that pushes new comments and
/// likes on a discussion thread to connected clients.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for posts, comments, likes, follows
/// - `services`: Business logic, including the live-update notifier
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
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
