/// Voice narration handler
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::handlers::TryOnState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

/// Request body for narration
#[derive(Deserialize, Validate)]
pub struct NarrateRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub voice_id: Option<String>,
}

/// Narrate a piece of province or garment text; responds with MP3 audio.
pub async fn narrate(
    state: web::Data<TryOnState>,
    config: web::Data<Config>,
    req: web::Json<NarrateRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let api_key = config
        .providers
        .elevenlabs_api_key
        .as_deref()
        .ok_or_else(|| AppError::NotConfigured("no voice API key registered".to_string()))?;

    let voice_id = req
        .voice_id
        .as_deref()
        .unwrap_or(&config.providers.elevenlabs_voice_id);

    let audio = state
        .elevenlabs
        .synthesize(api_key, voice_id, &req.text)
        .await
        .map_err(|e| {
            tracing::error!("voice synthesis failed: {:#}", e);
            AppError::Upstream("Voice synthesis failed".to_string())
        })?;

    Ok(HttpResponse::Ok().content_type("audio/mpeg").body(audio))
}
