/// Author-joined thread queries
///
/// These back both the comment listing endpoints and the live-update
/// notifier. The `*_since` variants take an optional exclusive lower bound
/// on `created_at`: `None` means no lower bound, so the first poll of a
/// session returns pre-existing rows up to the batch limit.
use crate::models::{CommentThread, CommentView, LikeEntry, UserSummary};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// Top-level comments on a post created strictly after `after`, oldest
/// first, each with its full reply subtree (replies oldest first).
pub async fn comment_threads_since(
    pool: &PgPool,
    post_id: Uuid,
    after: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<CommentThread>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.content, c.parent_comment_id, c.created_at,
               u.id AS user_id, u.username, u.display_name, u.avatar_url
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
          AND c.parent_comment_id IS NULL
          AND c.soft_delete IS NULL
          AND ($2::timestamptz IS NULL OR c.created_at > $2)
        ORDER BY c.created_at ASC
        LIMIT $3
        "#,
    )
    .bind(post_id)
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    attach_replies(pool, rows).await
}

/// Paginated listing of a post's comment threads, oldest first.
pub async fn list_comment_threads(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentThread>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.content, c.parent_comment_id, c.created_at,
               u.id AS user_id, u.username, u.display_name, u.avatar_url
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
          AND c.parent_comment_id IS NULL
          AND c.soft_delete IS NULL
        ORDER BY c.created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    attach_replies(pool, rows).await
}

/// Likes on a post created strictly after `after`, oldest first, each with
/// the liking user.
pub async fn likes_since(
    pool: &PgPool,
    post_id: Uuid,
    after: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<LikeEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT l.id, l.post_id, l.created_at,
               u.id AS user_id, u.username, u.display_name, u.avatar_url
        FROM likes l
        JOIN users u ON u.id = l.user_id
        WHERE l.post_id = $1
          AND ($2::timestamptz IS NULL OR l.created_at > $2)
        ORDER BY l.created_at ASC
        LIMIT $3
        "#,
    )
    .bind(post_id)
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| LikeEntry {
            id: row.get("id"),
            post_id: row.get("post_id"),
            created_at: row.get("created_at"),
            user: user_summary_from_row(row),
        })
        .collect())
}

/// Paginated listing of a post's likers, most recent first.
pub async fn list_post_likes(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<LikeEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT l.id, l.post_id, l.created_at,
               u.id AS user_id, u.username, u.display_name, u.avatar_url
        FROM likes l
        JOIN users u ON u.id = l.user_id
        WHERE l.post_id = $1
        ORDER BY l.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| LikeEntry {
            id: row.get("id"),
            post_id: row.get("post_id"),
            created_at: row.get("created_at"),
            user: user_summary_from_row(row),
        })
        .collect())
}

/// Fetch reply subtrees for a batch of top-level comment rows.
async fn attach_replies(
    pool: &PgPool,
    rows: Vec<PgRow>,
) -> Result<Vec<CommentThread>, sqlx::Error> {
    let parents: Vec<CommentView> = rows.iter().map(comment_view_from_row).collect();
    let parent_ids: Vec<Uuid> = parents.iter().map(|c| c.id).collect();
    let mut replies = replies_for(pool, &parent_ids).await?;

    Ok(parents
        .into_iter()
        .map(|comment| {
            let replies = replies.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect())
}

/// Replies for the given parent comments, grouped by parent, oldest first.
async fn replies_for(
    pool: &PgPool,
    parent_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<CommentView>>, sqlx::Error> {
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.content, c.parent_comment_id, c.created_at,
               u.id AS user_id, u.username, u.display_name, u.avatar_url
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.parent_comment_id = ANY($1)
          AND c.soft_delete IS NULL
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(parent_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for row in &rows {
        let view = comment_view_from_row(row);
        if let Some(parent) = view.parent_comment_id {
            grouped.entry(parent).or_default().push(view);
        }
    }

    Ok(grouped)
}

fn comment_view_from_row(row: &PgRow) -> CommentView {
    CommentView {
        id: row.get("id"),
        post_id: row.get("post_id"),
        content: row.get("content"),
        parent_comment_id: row.get("parent_comment_id"),
        created_at: row.get("created_at"),
        author: user_summary_from_row(row),
    }
}

fn user_summary_from_row(row: &PgRow) -> UserSummary {
    UserSummary {
        id: row.get("user_id"),
        username: row.get("username"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
    }
}
