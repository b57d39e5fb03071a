//! Wardrobe backend integration
//!
//! The wardrobe backend is our own garment try-on model, deployed on
//! several serverless targets. Each credential in the pool carries its own
//! endpoint URL and bearer token; the rotator spreads requests across the
//! deployments.
use crate::models::Garment;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Try-on client for the self-hosted wardrobe deployments
pub struct WardrobeClient {
    client: Client,
}

#[derive(Debug, Serialize)]
struct TryOnRequest {
    person_image: String,
    garment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    garment_image: Option<String>,
    seed: u32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TryOnResponse {
    image_url: Option<String>,
    error: Option<String>,
}

impl WardrobeClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Run a try-on against one wardrobe deployment; returns the result URL.
    pub async fn try_on(
        &self,
        endpoint: &str,
        token: &str,
        photo: &[u8],
        garment: &Garment,
        seed: u32,
    ) -> Result<String> {
        info!(endpoint = %endpoint, garment = %garment.name, seed, "Running wardrobe try-on");

        let request = TryOnRequest {
            person_image: BASE64.encode(photo),
            garment: garment.name.clone(),
            garment_image: garment.image_url.clone(),
            seed,
        };

        let url = format!("{}/api/try-on", endpoint.trim_end_matches('/'));
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .context("Failed to call wardrobe backend")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Wardrobe request failed");
            anyhow::bail!("Wardrobe backend error ({}): {}", status, error_text);
        }

        let body: TryOnResponse = response
            .json()
            .await
            .context("Failed to parse wardrobe response")?;

        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis(), "Wardrobe response received");

        body.image_url.with_context(|| {
            format!(
                "Wardrobe backend returned no image: {}",
                body.error.unwrap_or_default()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_image_url_parses() {
        let body: TryOnResponse =
            serde_json::from_str(r#"{"image_url": "https://cdn.example/out.png"}"#).unwrap();
        assert_eq!(body.image_url.as_deref(), Some("https://cdn.example/out.png"));
    }

    #[test]
    fn response_without_image_carries_the_error() {
        let body: TryOnResponse =
            serde_json::from_str(r#"{"error": "person not detected"}"#).unwrap();
        assert!(body.image_url.is_none());
        assert_eq!(body.error.as_deref(), Some("person not detected"));
    }
}
