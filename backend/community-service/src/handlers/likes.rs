/// Like handlers - HTTP endpoints for like operations
use crate::db::{like_repo, post_repo, thread_repo};
use crate::error::{AppError, Result};
use crate::handlers::PaginationParams;
use actix_web::{web, HttpResponse};
use session_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;

/// Like a post
pub async fn like_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    post_repo::get_post_by_id(pool.get_ref(), *post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if like_repo::find_like(pool.get_ref(), *post_id, user.0)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Post already liked".to_string()));
    }

    let like = like_repo::create_like(pool.get_ref(), *post_id, user.0).await?;

    Ok(HttpResponse::Created().json(like))
}

/// Remove a like from a post
pub async fn unlike_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    let deleted = like_repo::delete_like(pool.get_ref(), *post_id, user.0).await?;

    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("Like not found".to_string()))
    }
}

/// List the users who liked a post, with the total count
pub async fn get_post_likes(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let likes =
        thread_repo::list_post_likes(pool.get_ref(), *post_id, query.limit, query.offset).await?;
    let count = like_repo::count_likes_by_post(pool.get_ref(), *post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "count": count,
        "likes": likes,
    })))
}
