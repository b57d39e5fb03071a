/// In-memory TTL cache for garment lookups
///
/// A single map of key to (value, deadline). Entries expire lazily when
/// read; nothing sweeps the map in the background, which is fine for a
/// catalog this small.
use crate::db::garment_repo;
use crate::error::Result;
use crate::metrics;
use crate::models::Garment;
use dashmap::DashMap;
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

struct CachedGarment {
    garment: Garment,
    expires_at: Instant,
}

pub struct GarmentCache {
    entries: DashMap<Uuid, CachedGarment>,
    ttl: Duration,
}

impl GarmentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a cached garment, expiring it if its deadline has passed.
    pub fn get(&self, garment_id: Uuid) -> Option<Garment> {
        let entry = self.entries.get(&garment_id)?;

        if entry.expires_at <= Instant::now() {
            // Lazy expiry: release the read guard before removing.
            drop(entry);
            self.entries.remove(&garment_id);
            return None;
        }

        Some(entry.garment.clone())
    }

    /// Cache a garment for the configured TTL.
    pub fn insert(&self, garment: Garment) {
        self.entries.insert(
            garment.id,
            CachedGarment {
                garment,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

/// Fetch a garment through the cache, loading from the database on miss.
pub async fn fetch_garment(
    pool: &PgPool,
    cache: &GarmentCache,
    garment_id: Uuid,
) -> Result<Option<Garment>> {
    if let Some(garment) = cache.get(garment_id) {
        metrics::GARMENT_CACHE_EVENTS.with_label_values(&["hit"]).inc();
        return Ok(Some(garment));
    }

    metrics::GARMENT_CACHE_EVENTS.with_label_values(&["miss"]).inc();
    let garment = garment_repo::get_garment_by_id(pool, garment_id).await?;

    if let Some(ref garment) = garment {
        cache.insert(garment.clone());
    }

    Ok(garment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn garment() -> Garment {
        Garment {
            id: Uuid::new_v4(),
            name: "Ulos".to_string(),
            province: "Sumatera Utara".to_string(),
            description: None,
            image_url: None,
            prompt_hint: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_its_deadline() {
        let cache = GarmentCache::new(Duration::from_secs(300));
        let g = garment();
        let id = g.id;

        cache.insert(g);
        assert!(cache.get(id).is_some());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_removed_on_read() {
        let cache = GarmentCache::new(Duration::from_secs(300));
        let g = garment();
        let id = g.id;

        cache.insert(g);
        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(cache.get(id).is_none());
        assert!(cache.entries.is_empty(), "expired entry must be evicted");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_key_is_a_miss() {
        let cache = GarmentCache::new(Duration::from_secs(300));
        assert!(cache.get(Uuid::new_v4()).is_none());
    }
}
