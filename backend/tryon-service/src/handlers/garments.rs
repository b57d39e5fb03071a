/// Garment catalog handlers
use crate::db::garment_repo;
use crate::error::{AppError, Result};
use crate::handlers::{PaginationParams, TryOnState};
use crate::services::fetch_garment;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct GarmentFilter {
    pub province: Option<String>,
}

/// List the garment catalog, optionally filtered by province
pub async fn list_garments(
    pool: web::Data<PgPool>,
    filter: web::Query<GarmentFilter>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let garments = garment_repo::list_garments(
        pool.get_ref(),
        filter.province.as_deref(),
        query.limit,
        query.offset,
    )
    .await?;

    Ok(HttpResponse::Ok().json(garments))
}

/// Get a single garment (served through the TTL cache)
pub async fn get_garment(
    state: web::Data<TryOnState>,
    pool: web::Data<PgPool>,
    garment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match fetch_garment(pool.get_ref(), &state.garment_cache, *garment_id).await? {
        Some(garment) => Ok(HttpResponse::Ok().json(garment)),
        None => Err(AppError::NotFound("Garment not found".to_string())),
    }
}
