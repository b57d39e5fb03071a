//! ElevenLabs text-to-speech integration
//!
//! Narrates province and garment descriptions. Single configured account;
//! voice requests are rare enough that no pool is kept for this provider.
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

const TTS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// ElevenLabs speech synthesis client
pub struct ElevenLabsClient {
    client: Client,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Synthesize speech; returns MP3 bytes.
    pub async fn synthesize(&self, api_key: &str, voice_id: &str, text: &str) -> Result<Vec<u8>> {
        info!(voice_id = %voice_id, chars = text.len(), "Synthesizing narration");

        let url = format!("{}/{}", TTS_URL, voice_id);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&SpeechRequest {
                text,
                model_id: DEFAULT_MODEL_ID,
            })
            .send()
            .await
            .context("Failed to call ElevenLabs API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "ElevenLabs request failed");
            anyhow::bail!("ElevenLabs API error ({}): {}", status, error_text);
        }

        let audio = response
            .bytes()
            .await
            .context("Failed to read ElevenLabs audio body")?;

        if audio.is_empty() {
            anyhow::bail!("ElevenLabs returned an empty audio body");
        }

        let elapsed = start.elapsed();
        debug!(
            elapsed_ms = elapsed.as_millis(),
            bytes = audio.len(),
            "Narration synthesized"
        );

        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_request_serializes_expected_fields() {
        let request = SpeechRequest {
            text: "Selamat datang di Sumatera Barat",
            model_id: DEFAULT_MODEL_ID,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"text\""));
        assert!(json.contains("eleven_multilingual_v2"));
    }
}
