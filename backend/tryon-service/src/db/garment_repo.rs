use crate::models::Garment;
use sqlx::PgPool;
use uuid::Uuid;

/// Get a single garment by ID
pub async fn get_garment_by_id(
    pool: &PgPool,
    garment_id: Uuid,
) -> Result<Option<Garment>, sqlx::Error> {
    let garment = sqlx::query_as::<_, Garment>(
        r#"
        SELECT id, name, province, description, image_url, prompt_hint, created_at
        FROM garments
        WHERE id = $1
        "#,
    )
    .bind(garment_id)
    .fetch_optional(pool)
    .await?;

    Ok(garment)
}

/// List garments, optionally filtered by province
pub async fn list_garments(
    pool: &PgPool,
    province: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Garment>, sqlx::Error> {
    let garments = sqlx::query_as::<_, Garment>(
        r#"
        SELECT id, name, province, description, image_url, prompt_hint, created_at
        FROM garments
        WHERE ($1::text IS NULL OR province = $1)
        ORDER BY province ASC, name ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(province)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(garments)
}
