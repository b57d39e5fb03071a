/// Credential rotator
///
/// Every outbound image-generation request checks out one credential from
/// the persisted pool: the pool is read fresh, the least-used record wins
/// (ties by insertion order), and its usage counter is persisted before
/// the outbound call is issued. Least-used-first approximates round-robin
/// without a cursor and self-heals when credentials are added or removed.
///
/// Two concurrent checkouts can both read the same minimum and pick the
/// same credential; the counter increment itself is atomic in the store,
/// but the selection is best-effort load spreading, not a strict
/// round-robin guarantee. Keep it lock-free.
use crate::db::credential_repo;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::ProviderCredential;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Persisted credential pool access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Full pool for a provider, ascending by usage count, stable ties.
    async fn list_by_usage(&self, provider: &str) -> Result<Vec<ProviderCredential>>;

    /// Durably record one use of a credential.
    async fn record_use(&self, credential_id: Uuid) -> Result<()>;
}

/// PostgreSQL-backed credential store.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn list_by_usage(&self, provider: &str) -> Result<Vec<ProviderCredential>> {
        Ok(credential_repo::list_by_usage(&self.pool, provider).await?)
    }

    async fn record_use(&self, credential_id: Uuid) -> Result<()> {
        Ok(credential_repo::record_use(&self.pool, credential_id).await?)
    }
}

/// Selects a credential for each outbound generation request.
pub struct CredentialRotator<S> {
    store: S,
}

impl<S: CredentialStore> CredentialRotator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check out the least-used credential for a provider.
    ///
    /// Fails with a configuration error when the pool is empty, before
    /// any outbound request could be attempted. The use is recorded before
    /// the credential is handed out, so a later upstream failure does not
    /// roll the count back.
    pub async fn checkout(&self, provider: &str) -> Result<ProviderCredential> {
        let pool = self.store.list_by_usage(provider).await?;

        let Some(credential) = pool.into_iter().next() else {
            return Err(AppError::NotConfigured(format!(
                "no {provider} credentials registered"
            )));
        };

        self.store.record_use(credential.id).await?;

        metrics::CREDENTIAL_CHECKOUTS
            .with_label_values(&[provider])
            .inc();
        tracing::debug!(provider, credential = %credential.label, "credential checked out");

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::sync::Mutex;

    fn credential(label: &str, usage_count: i64, created_secs: i64) -> ProviderCredential {
        ProviderCredential {
            id: Uuid::new_v4(),
            provider: "gemini".to_string(),
            label: label.to_string(),
            endpoint: None,
            api_key: "sk-test".to_string(),
            usage_count,
            created_at: Utc.timestamp_opt(1_700_000_000 + created_secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn empty_pool_fails_with_configuration_error() {
        let mut store = MockCredentialStore::new();
        store.expect_list_by_usage().returning(|_| Ok(vec![]));
        // No use may be recorded when nothing can be selected.
        store.expect_record_use().times(0);

        let rotator = CredentialRotator::new(store);
        let err = rotator.checkout("gemini").await.unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn picks_minimum_usage_and_records_it() {
        // Pool with counts [3, 1, 1]: one of the two count-1 records wins,
        // and the store's stable order says which (insertion order).
        let b = credential("b", 1, 10);
        let c = credential("c", 1, 20);
        let a = credential("a", 3, 0);
        let (b_id, b_label) = (b.id, b.label.clone());

        let mut store = MockCredentialStore::new();
        let listed = vec![b, c, a];
        store
            .expect_list_by_usage()
            .returning(move |_| Ok(listed.clone()));
        store
            .expect_record_use()
            .withf(move |id| *id == b_id)
            .times(1)
            .returning(|_| Ok(()));

        let rotator = CredentialRotator::new(store);
        let picked = rotator.checkout("gemini").await.unwrap();
        assert_eq!(picked.label, b_label);
    }

    #[tokio::test]
    async fn sequential_checkouts_alternate_over_a_tied_pool() {
        // Pool starts as {a: 0, b: 0}; after a is used once the store
        // returns b first, so two checkouts end with counts {a: 1, b: 1}.
        let a = credential("a", 0, 0);
        let b = credential("b", 0, 10);
        let (a_id, b_id) = (a.id, b.id);

        let calls = Arc::new(AtomicUsize::new(0));
        let recorded: Arc<Mutex<Vec<Uuid>>> = Arc::new(Mutex::new(vec![]));

        let mut store = MockCredentialStore::new();
        let listing_calls = calls.clone();
        store.expect_list_by_usage().returning(move |_| {
            if listing_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![a.clone(), b.clone()])
            } else {
                let mut a_used = a.clone();
                a_used.usage_count = 1;
                Ok(vec![b.clone(), a_used])
            }
        });
        let seen = recorded.clone();
        store.expect_record_use().times(2).returning(move |id| {
            seen.lock().unwrap().push(id);
            Ok(())
        });

        let rotator = CredentialRotator::new(store);
        let first = rotator.checkout("gemini").await.unwrap();
        let second = rotator.checkout("gemini").await.unwrap();

        assert_eq!(first.id, a_id);
        assert_eq!(second.id, b_id);
        assert_eq!(*recorded.lock().unwrap(), vec![a_id, b_id]);
    }

    #[tokio::test]
    async fn store_failure_during_record_surfaces() {
        let a = credential("a", 0, 0);
        let mut store = MockCredentialStore::new();
        store
            .expect_list_by_usage()
            .returning(move |_| Ok(vec![a.clone()]));
        store
            .expect_record_use()
            .returning(|_| Err(AppError::Internal("write failed".to_string())));

        let rotator = CredentialRotator::new(store);
        assert!(rotator.checkout("gemini").await.is_err());
    }
}
