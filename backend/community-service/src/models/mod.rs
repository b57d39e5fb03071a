/// Data models for community-service
///
/// Row structs mirror the PostgreSQL schema (see `migrations/`). View
/// structs (`CommentView`, `CommentThread`, `LikeEntry`) carry the author
/// alongside the row and are what the API and the live-update stream emit.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user, as embedded in API responses.
///
/// The `users` table is owned by the external auth provider; this service
/// only reads it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A community post, optionally tagged with the province it relates to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub province: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub soft_delete: Option<DateTime<Utc>>,
}

/// A comment row. Top-level comments have `parent_comment_id = NULL`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub soft_delete: Option<DateTime<Utc>>,
}

/// A like row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A follow edge.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Follow {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A comment with its author attached.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub author: UserSummary,
}

/// A top-level comment with its reply subtree, replies oldest-first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

/// A like with the liking user attached.
#[derive(Debug, Clone, Serialize)]
pub struct LikeEntry {
    pub id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// One live-update event: everything new on a thread since the session's
/// watermarks, both series in a single payload.
#[derive(Debug, Clone, Serialize)]
pub struct LiveUpdatePayload {
    pub comments: Vec<CommentThread>,
    pub likes: Vec<LikeEntry>,
}
