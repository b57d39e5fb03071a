/// HTTP request handlers for community-service
pub mod comments;
pub mod follows;
pub mod likes;
pub mod live;
pub mod posts;

pub use comments::*;
pub use follows::*;
pub use likes::*;
pub use live::*;
pub use posts::*;

use serde::Deserialize;

/// Common pagination query parameters
#[derive(Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
