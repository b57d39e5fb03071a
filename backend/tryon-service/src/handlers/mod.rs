/// HTTP request handlers for tryon-service
pub mod garments;
pub mod tryon;
pub mod uploads;
pub mod voice;

pub use garments::*;
pub use tryon::*;
pub use uploads::*;
pub use voice::*;

use crate::providers::{ElevenLabsClient, GeminiClient, QwenClient, WardrobeClient};
use crate::services::{CredentialRotator, GarmentCache, PgCredentialStore};
use serde::Deserialize;

/// Shared handler state: provider clients, the credential rotator, and the
/// garment cache.
pub struct TryOnState {
    pub rotator: CredentialRotator<PgCredentialStore>,
    pub gemini: GeminiClient,
    pub qwen: QwenClient,
    pub wardrobe: WardrobeClient,
    pub elevenlabs: ElevenLabsClient,
    pub garment_cache: GarmentCache,
}

/// Common pagination query parameters
#[derive(Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}
