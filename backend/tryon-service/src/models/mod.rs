/// Data models for tryon-service
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// One registered third-party account in the credential pool.
///
/// `usage_count` is non-negative and only ever incremented; selection
/// always picks the record with the minimum count, ties broken by
/// `created_at` (insertion order). `endpoint` is set for providers with
/// per-deployment targets and absent for fixed-endpoint providers.
#[derive(Clone, FromRow)]
pub struct ProviderCredential {
    pub id: Uuid,
    pub provider: String,
    pub label: String,
    pub endpoint: Option<String>,
    pub api_key: String,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("label", &self.label)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("usage_count", &self.usage_count)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A traditional garment from the catalog.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Garment {
    pub id: Uuid,
    pub name: String,
    pub province: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Extra guidance appended to generation prompts for this garment
    pub prompt_hint: Option<String>,
    pub created_at: DateTime<Utc>,
}
