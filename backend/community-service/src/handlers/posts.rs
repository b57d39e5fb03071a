/// Post handlers - HTTP endpoints for post operations
use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::handlers::PaginationParams;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use session_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a post
#[derive(Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 2200))]
    pub content: String,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub province: Option<String>,
}

/// Create a new post
pub async fn create_post(
    pool: web::Data<PgPool>,
    user: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let post = post_repo::create_post(
        pool.get_ref(),
        user.0,
        &req.content,
        req.image_url.as_deref(),
        req.province.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a single post
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    match post_repo::get_post_by_id(pool.get_ref(), *post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::NotFound("Post not found".to_string())),
    }
}

/// Get posts authored by a user
pub async fn get_user_posts(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let posts =
        post_repo::get_posts_by_user(pool.get_ref(), *user_id, query.limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Soft delete a post
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    let deleted = post_repo::soft_delete_post(pool.get_ref(), *post_id, user.0).await?;

    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("Post not found".to_string()))
    }
}
