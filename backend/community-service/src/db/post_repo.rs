use crate::models::Post;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new post
pub async fn create_post(
    pool: &PgPool,
    user_id: Uuid,
    content: &str,
    image_url: Option<&str>,
    province: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, content, image_url, province)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, content, image_url, province, created_at, updated_at, soft_delete
        "#,
    )
    .bind(user_id)
    .bind(content)
    .bind(image_url)
    .bind(province)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Get a single post by ID (excluding soft-deleted)
pub async fn get_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, image_url, province, created_at, updated_at, soft_delete
        FROM posts
        WHERE id = $1 AND soft_delete IS NULL
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Get posts by a user, newest first
pub async fn get_posts_by_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, image_url, province, created_at, updated_at, soft_delete
        FROM posts
        WHERE user_id = $1 AND soft_delete IS NULL
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Soft delete a post owned by the given user
pub async fn soft_delete_post(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET soft_delete = NOW()
        WHERE id = $1 AND user_id = $2 AND soft_delete IS NULL
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
