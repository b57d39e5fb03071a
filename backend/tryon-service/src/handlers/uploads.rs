/// Upload handlers - presigned object-storage uploads
///
/// Clients upload photos directly to the bucket with a short-lived
/// presigned PUT URL; the service never proxies the bytes.
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::storage;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use session_auth::UserId;
use uuid::Uuid;

/// Request body for a presigned upload
#[derive(Deserialize)]
pub struct PresignRequest {
    pub file_name: String,
    pub content_type: String,
}

/// Issue a presigned PUT URL for a photo upload
pub async fn presign_upload(
    s3: web::Data<aws_sdk_s3::Client>,
    config: web::Data<Config>,
    user: UserId,
    req: web::Json<PresignRequest>,
) -> Result<HttpResponse> {
    if req.file_name.trim().is_empty() {
        return Err(AppError::BadRequest("file_name is required".to_string()));
    }
    if !req.content_type.starts_with("image/") {
        return Err(AppError::BadRequest(
            "Only image uploads are supported".to_string(),
        ));
    }
    if config.s3.bucket.is_empty() {
        return Err(AppError::NotConfigured(
            "no upload bucket registered".to_string(),
        ));
    }

    let object_key = object_key_for(user.0, &req.file_name);
    let upload_url = storage::generate_presigned_upload_url(
        s3.get_ref(),
        &config.s3,
        &object_key,
        &req.content_type,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "upload_url": upload_url,
        "object_key": object_key,
        "public_url": storage::public_url(&config.s3, &object_key),
    })))
}

/// Object key for a user photo: random name, original extension kept.
fn object_key_for(user_id: Uuid, file_name: &str) -> String {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");

    format!("uploads/{}/{}.{}", user_id, Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_keeps_the_extension() {
        let user_id = Uuid::new_v4();
        let key = object_key_for(user_id, "selfie.png");
        assert!(key.starts_with(&format!("uploads/{}/", user_id)));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn object_key_defaults_extension() {
        let key = object_key_for(Uuid::new_v4(), "selfie");
        assert!(key.ends_with(".jpg"));
    }
}
