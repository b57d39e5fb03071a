//! Qwen (DashScope) image edit integration
//!
//! DashScope takes the user photo as a data URL plus the styling prompt
//! and answers with a hosted image URL. The contract calls for a fresh
//! seed on every request.
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const GENERATION_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/multimodal-generation/generation";

/// DashScope multimodal generation client
pub struct QwenClient {
    client: Client,
    model: String,
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct GenerationRequest {
    model: String,
    input: Input,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Input {
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContentItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Parameters {
    seed: u32,
    watermark: bool,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GenerationResponse {
    output: Option<Output>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Output {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Vec<ContentItem>,
}

impl QwenClient {
    pub fn new(model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, model }
    }

    /// Generate a styled image; returns the hosted result URL.
    pub async fn edit_image(
        &self,
        api_key: &str,
        photo: &[u8],
        photo_mime: &str,
        prompt: &str,
        seed: u32,
    ) -> Result<String> {
        info!(model = %self.model, seed, "Generating image with Qwen");

        let request = GenerationRequest {
            model: self.model.clone(),
            input: Input {
                messages: vec![Message {
                    role: "user".to_string(),
                    content: vec![
                        ContentItem {
                            image: Some(format!(
                                "data:{};base64,{}",
                                photo_mime,
                                BASE64.encode(photo)
                            )),
                            text: None,
                        },
                        ContentItem {
                            image: None,
                            text: Some(prompt.to_string()),
                        },
                    ],
                }],
            },
            parameters: Parameters {
                seed,
                watermark: false,
            },
        };

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(GENERATION_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call DashScope API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "DashScope request failed");
            anyhow::bail!("DashScope API error ({}): {}", status, error_text);
        }

        let body: GenerationResponse = response
            .json()
            .await
            .context("Failed to parse DashScope response")?;

        let elapsed = start.elapsed();
        debug!(elapsed_ms = elapsed.as_millis(), "DashScope response received");

        extract_image_url(body)
    }
}

/// Pull the result image URL out of a generation response.
fn extract_image_url(body: GenerationResponse) -> Result<String> {
    if let Some(code) = body.code.filter(|c| !c.is_empty()) {
        anyhow::bail!(
            "DashScope error {}: {}",
            code,
            body.message.unwrap_or_default()
        );
    }

    body.output
        .and_then(|o| o.choices)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|c| c.message.content)
        .find_map(|item| item.image)
        .context("DashScope returned no image")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_image_url_from_response() {
        let body: GenerationResponse = serde_json::from_str(
            r#"{
                "output": {
                    "choices": [{
                        "finish_reason": "stop",
                        "message": {
                            "role": "assistant",
                            "content": [{"image": "https://dashscope-result.oss.example/result.png"}]
                        }
                    }]
                },
                "usage": {"image_count": 1},
                "request_id": "3d5bbfa0"
            }"#,
        )
        .unwrap();

        assert_eq!(
            extract_image_url(body).unwrap(),
            "https://dashscope-result.oss.example/result.png"
        );
    }

    #[test]
    fn error_code_in_body_is_an_error() {
        let body: GenerationResponse = serde_json::from_str(
            r#"{"code": "InvalidParameter", "message": "seed out of range", "request_id": "x"}"#,
        )
        .unwrap();

        let err = extract_image_url(body).unwrap_err();
        assert!(err.to_string().contains("InvalidParameter"));
    }

    #[test]
    fn missing_image_is_an_error() {
        let body: GenerationResponse = serde_json::from_str(
            r#"{"output": {"choices": [{"message": {"content": [{"text": "no image"}]}}]}}"#,
        )
        .unwrap();

        assert!(extract_image_url(body).is_err());
    }
}
