use crate::models::{Follow, UserSummary};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a follow edge
pub async fn create_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<Follow, sqlx::Error> {
    let follow = sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (follower_id, followee_id)
        VALUES ($1, $2)
        RETURNING follower_id, followee_id, created_at
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_one(pool)
    .await?;

    Ok(follow)
}

/// Remove a follow edge
pub async fn delete_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM follows
        WHERE follower_id = $1 AND followee_id = $2
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether a follow edge exists
pub async fn find_follow(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<Option<Follow>, sqlx::Error> {
    let follow = sqlx::query_as::<_, Follow>(
        r#"
        SELECT follower_id, followee_id, created_at
        FROM follows
        WHERE follower_id = $1 AND followee_id = $2
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_optional(pool)
    .await?;

    Ok(follow)
}

/// Users following the given user, most recent first
pub async fn get_followers(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.display_name, u.avatar_url
        FROM follows f
        JOIN users u ON u.id = f.follower_id
        WHERE f.followee_id = $1
        ORDER BY f.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Users the given user follows, most recent first
pub async fn get_following(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.display_name, u.avatar_url
        FROM follows f
        JOIN users u ON u.id = f.followee_id
        WHERE f.follower_id = $1
        ORDER BY f.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
