//! Gemini image generation integration
//!
//! Gemini takes the user photo inline (base64) plus the styling prompt and
//! answers with an inline image part. The API key comes from the credential
//! pool per call.
use super::GeneratedImage;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini generateContent client
pub struct GeminiClient {
    client: Client,
    model: String,
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CandidatePart {
    inline_data: Option<CandidateInlineData>,
    #[allow(dead_code)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateInlineData {
    mime_type: String,
    data: String,
}

impl GeminiClient {
    pub fn new(model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, model }
    }

    /// Generate a styled image from a photo and a prompt.
    pub async fn edit_image(
        &self,
        api_key: &str,
        photo: &[u8],
        photo_mime: &str,
        prompt: &str,
    ) -> Result<GeneratedImage> {
        info!(model = %self.model, "Generating image with Gemini");

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: photo_mime.to_string(),
                            data: BASE64.encode(photo),
                        }),
                    },
                ],
            }],
        };

        let start = std::time::Instant::now();
        let url = format!("{}/{}:generateContent?key={}", GENERATE_URL, self.model, api_key);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to call Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "Gemini request failed");
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis(), "Gemini response received");

        extract_image(body)
    }
}

/// Pull the first inline image out of a generateContent response.
fn extract_image(body: GenerateResponse) -> Result<GeneratedImage> {
    let inline = body
        .candidates
        .unwrap_or_default()
        .into_iter()
        .flat_map(|c| c.content.and_then(|c| c.parts).unwrap_or_default())
        .find_map(|p| p.inline_data)
        .context("Gemini returned no image")?;

    let data = BASE64
        .decode(inline.data.as_bytes())
        .context("Gemini returned invalid base64 image data")?;

    Ok(GeneratedImage {
        mime_type: inline.mime_type,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_inline_data() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: "aGFsbw==".to_string(),
                    }),
                }],
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"inlineData\""));
        assert!(json.contains("\"mimeType\""));
        assert!(!json.contains("\"text\""), "unset fields must be omitted");
    }

    #[test]
    fn extracts_first_inline_image_from_response() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "Here is your image"},
                            {"inlineData": {"mimeType": "image/png", "data": "aGFsbw=="}}
                        ],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();

        let image = extract_image(body).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, b"halo");
    }

    #[test]
    fn text_only_response_is_an_error() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "cannot comply"}]}}]}"#,
        )
        .unwrap();

        assert!(extract_image(body).is_err());
    }

    #[test]
    fn empty_response_is_an_error() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_image(body).is_err());
    }
}
