/// Follow handlers - HTTP endpoints for the social graph
use crate::db::follow_repo;
use crate::error::{AppError, Result};
use crate::handlers::PaginationParams;
use actix_web::{web, HttpResponse};
use session_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;

/// Follow a user
pub async fn follow_user(
    pool: web::Data<PgPool>,
    followee_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    if *followee_id == user.0 {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }

    if follow_repo::find_follow(pool.get_ref(), user.0, *followee_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Already following".to_string()));
    }

    let follow = follow_repo::create_follow(pool.get_ref(), user.0, *followee_id).await?;

    Ok(HttpResponse::Created().json(follow))
}

/// Unfollow a user
pub async fn unfollow_user(
    pool: web::Data<PgPool>,
    followee_id: web::Path<Uuid>,
    user: UserId,
) -> Result<HttpResponse> {
    let deleted = follow_repo::delete_follow(pool.get_ref(), user.0, *followee_id).await?;

    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound("Follow not found".to_string()))
    }
}

/// List a user's followers
pub async fn get_followers(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let users =
        follow_repo::get_followers(pool.get_ref(), *user_id, query.limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(users))
}

/// List the users a user follows
pub async fn get_following(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let users =
        follow_repo::get_following(pool.get_ref(), *user_id, query.limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(users))
}
