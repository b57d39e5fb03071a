//! Clients for the external generation APIs
//!
//! Each provider gets its own module with typed wire structs. Clients are
//! constructed once at boot with a shared timeout; per-account secrets are
//! supplied per call from the credential pool.
pub mod elevenlabs;
pub mod gemini;
pub mod qwen;
pub mod wardrobe;

pub use elevenlabs::ElevenLabsClient;
pub use gemini::GeminiClient;
pub use qwen::QwenClient;
pub use wardrobe::WardrobeClient;

use rand::Rng;

/// Stable provider identifiers, as stored in the credential pool.
pub const GEMINI: &str = "gemini";
pub const QWEN: &str = "qwen";
pub const WARDROBE: &str = "wardrobe";

/// An image returned inline by a provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Fresh random seed for providers whose contract takes one.
pub fn fresh_seed() -> u32 {
    rand::thread_rng().gen()
}
