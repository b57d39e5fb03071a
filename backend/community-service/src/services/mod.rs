/// Business logic layer for community-service
pub mod live_updates;

pub use live_updates::{LiveUpdateFeed, PgThreadStore, ThreadStore};
