use crate::models::Comment;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new comment on a post
pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
    parent_comment_id: Option<Uuid>,
) -> Result<Comment, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, user_id, content, parent_comment_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, post_id, user_id, content, parent_comment_id, created_at, updated_at, soft_delete
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .bind(parent_comment_id)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

/// Get a single comment by ID
pub async fn get_comment_by_id(
    pool: &PgPool,
    comment_id: Uuid,
) -> Result<Option<Comment>, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, user_id, content, parent_comment_id, created_at, updated_at, soft_delete
        FROM comments
        WHERE id = $1 AND soft_delete IS NULL
        "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(comment)
}

/// Soft delete a comment owned by the given user
pub async fn soft_delete_comment(
    pool: &PgPool,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE comments
        SET soft_delete = NOW()
        WHERE id = $1 AND user_id = $2 AND soft_delete IS NULL
        "#,
    )
    .bind(comment_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
