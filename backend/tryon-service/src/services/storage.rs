/// Object storage helpers for user photo uploads
///
/// Provides presigned URL generation so clients upload directly to the
/// bucket without this service seeing the bytes or the AWS credentials
/// leaving the server.
use crate::config::S3Config;
use crate::error::{AppError, Result};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

/// Default presigned URL expiry time (15 minutes)
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 900;

/// Generate a presigned URL for uploading a file to the bucket.
///
/// The URL allows a single PUT of the given content type and expires
/// after 15 minutes.
pub async fn generate_presigned_upload_url(
    client: &Client,
    config: &S3Config,
    object_key: &str,
    content_type: &str,
) -> Result<String> {
    let expires_in = Duration::from_secs(DEFAULT_PRESIGNED_URL_EXPIRY_SECS);
    let presigning_config = PresigningConfig::builder()
        .expires_in(expires_in)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create presigning config: {e}")))?;

    let presigned_request = client
        .put_object()
        .bucket(&config.bucket)
        .key(object_key)
        .content_type(content_type)
        .presigned(presigning_config)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to generate presigned URL: {e}")))?;

    Ok(presigned_request.uri().to_string())
}

/// Public URL an uploaded object will be reachable under.
pub fn public_url(config: &S3Config, object_key: &str) -> String {
    format!(
        "{}/{}",
        config.public_base_url.trim_end_matches('/'),
        object_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_cleanly() {
        let config = S3Config {
            bucket: "arunika-uploads".to_string(),
            region: "ap-southeast-1".to_string(),
            public_base_url: "https://cdn.arunika.app/".to_string(),
        };

        assert_eq!(
            public_url(&config, "uploads/u1/photo.jpg"),
            "https://cdn.arunika.app/uploads/u1/photo.jpg"
        );
    }
}
