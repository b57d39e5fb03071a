/// Comment handlers - HTTP endpoints for comment operations
use crate::db::{comment_repo, thread_repo};
use crate::error::{AppError, Result};
use crate::handlers::PaginationParams;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use session_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a comment
#[derive(Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

/// Create a new comment (or a reply, when `parent_comment_id` is given)
pub async fn create_comment(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if let Some(parent_id) = req.parent_comment_id {
        let parent = comment_repo::get_comment_by_id(pool.get_ref(), parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;
        if parent.post_id != *post_id {
            return Err(AppError::BadRequest(
                "Parent comment belongs to a different post".to_string(),
            ));
        }
    }

    let comment = comment_repo::create_comment(
        pool.get_ref(),
        *post_id,
        user.0,
        &req.content,
        req.parent_comment_id,
    )
    .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Get a post's comment threads with authors and replies
pub async fn get_post_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let threads =
        thread_repo::list_comment_threads(pool.get_ref(), *post_id, query.limit, query.offset)
            .await?;

    Ok(HttpResponse::Ok().json(threads))
}

/// Soft delete a comment
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    let deleted = comment_repo::soft_delete_comment(pool.get_ref(), *comment_id, user.0).await?;

    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("Comment not found".to_string()))
    }
}
