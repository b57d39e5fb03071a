/// Try-on handlers - one endpoint per image-generation provider
///
/// All three accept a multipart submission with the user photo. Upstream
/// HTTP failures and malformed upstream responses surface uniformly as one
/// opaque processing error; there is no in-request retry or credential
/// fallback; a client retry hits the rotator again.
use crate::error::{AppError, Result};
use crate::handlers::TryOnState;
use crate::metrics;
use crate::providers;
use crate::services::fetch_garment;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::TryStreamExt as _;
use sqlx::PgPool;
use uuid::Uuid;

/// Upper bound on an uploaded photo (8 MB)
const MAX_PHOTO_BYTES: usize = 8 * 1024 * 1024;

/// Fields accepted by the try-on endpoints
struct TryOnSubmission {
    photo: Vec<u8>,
    photo_mime: String,
    prompt: Option<String>,
    garment_id: Option<Uuid>,
}

/// Collect the multipart fields of a try-on submission.
async fn read_submission(mut payload: Multipart) -> Result<TryOnSubmission> {
    let mut photo: Vec<u8> = Vec::new();
    let mut photo_mime: Option<String> = None;
    let mut prompt: Option<String> = None;
    let mut garment_id: Option<Uuid> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                photo_mime = field.content_type().map(|m| m.to_string());
                while let Some(chunk) = field
                    .try_next()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {e}")))?
                {
                    if photo.len() + chunk.len() > MAX_PHOTO_BYTES {
                        return Err(AppError::BadRequest("Photo is too large".to_string()));
                    }
                    photo.extend_from_slice(&chunk);
                }
            }
            "prompt" => prompt = Some(read_text_field(&mut field).await?),
            "garment_id" => {
                let raw = read_text_field(&mut field).await?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::BadRequest("garment_id must be a UUID".to_string()))?;
                garment_id = Some(parsed);
            }
            _ => {
                // Unknown fields are drained and ignored.
                while field
                    .try_next()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
                    .is_some()
                {}
            }
        }
    }

    if photo.is_empty() {
        return Err(AppError::BadRequest("photo field is required".to_string()));
    }

    Ok(TryOnSubmission {
        photo,
        photo_mime: photo_mime.unwrap_or_else(|| "image/jpeg".to_string()),
        prompt,
        garment_id,
    })
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?
    {
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8(buf).map_err(|_| AppError::BadRequest("Field must be UTF-8".to_string()))
}

/// Map a provider failure to the single opaque error clients see.
fn upstream_failure(provider: &str, err: anyhow::Error) -> AppError {
    tracing::error!(provider, "image generation failed: {:#}", err);
    metrics::TRYON_REQUESTS
        .with_label_values(&[provider, "error"])
        .inc();
    AppError::Upstream("Image processing failed".to_string())
}

/// Try on via Gemini; returns the generated image inline.
pub async fn tryon_gemini(
    state: web::Data<TryOnState>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let submission = read_submission(payload).await?;
    let prompt = submission
        .prompt
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("prompt field is required".to_string()))?;

    let credential = state.rotator.checkout(providers::GEMINI).await?;
    let image = state
        .gemini
        .edit_image(
            &credential.api_key,
            &submission.photo,
            &submission.photo_mime,
            prompt,
        )
        .await
        .map_err(|e| upstream_failure(providers::GEMINI, e))?;

    metrics::TRYON_REQUESTS
        .with_label_values(&[providers::GEMINI, "ok"])
        .inc();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "image": BASE64.encode(&image.data),
        "mime_type": image.mime_type,
    })))
}

/// Try on via Qwen; returns the hosted result URL.
pub async fn tryon_qwen(state: web::Data<TryOnState>, payload: Multipart) -> Result<HttpResponse> {
    let submission = read_submission(payload).await?;
    let prompt = submission
        .prompt
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("prompt field is required".to_string()))?;

    let credential = state.rotator.checkout(providers::QWEN).await?;
    let image_url = state
        .qwen
        .edit_image(
            &credential.api_key,
            &submission.photo,
            &submission.photo_mime,
            prompt,
            providers::fresh_seed(),
        )
        .await
        .map_err(|e| upstream_failure(providers::QWEN, e))?;

    metrics::TRYON_REQUESTS
        .with_label_values(&[providers::QWEN, "ok"])
        .inc();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "image_url": image_url })))
}

/// Try on a catalog garment via the wardrobe deployments.
pub async fn tryon_wardrobe(
    state: web::Data<TryOnState>,
    pool: web::Data<PgPool>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let submission = read_submission(payload).await?;
    let garment_id = submission
        .garment_id
        .ok_or_else(|| AppError::BadRequest("garment_id field is required".to_string()))?;

    let garment = fetch_garment(pool.get_ref(), &state.garment_cache, garment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Garment not found".to_string()))?;

    let credential = state.rotator.checkout(providers::WARDROBE).await?;
    let endpoint = credential.endpoint.as_deref().ok_or_else(|| {
        AppError::NotConfigured("wardrobe credential has no endpoint".to_string())
    })?;

    let image_url = state
        .wardrobe
        .try_on(
            endpoint,
            &credential.api_key,
            &submission.photo,
            &garment,
            providers::fresh_seed(),
        )
        .await
        .map_err(|e| upstream_failure(providers::WARDROBE, e))?;

    metrics::TRYON_REQUESTS
        .with_label_values(&[providers::WARDROBE, "ok"])
        .inc();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "image_url": image_url })))
}
