use crate::models::ProviderCredential;
use sqlx::PgPool;
use uuid::Uuid;

/// Full credential pool for a provider, least-used first.
///
/// Ties break by `created_at`, so the selection order is stable across
/// reads. The pool is read fresh on every call; there is no in-process
/// copy to go stale when credentials are added or removed.
pub async fn list_by_usage(
    pool: &PgPool,
    provider: &str,
) -> Result<Vec<ProviderCredential>, sqlx::Error> {
    let credentials = sqlx::query_as::<_, ProviderCredential>(
        r#"
        SELECT id, provider, label, endpoint, api_key, usage_count, created_at
        FROM provider_credentials
        WHERE provider = $1
        ORDER BY usage_count ASC, created_at ASC
        "#,
    )
    .bind(provider)
    .fetch_all(pool)
    .await?;

    Ok(credentials)
}

/// Record one use of a credential.
///
/// The increment happens inside the database, so concurrent uses never
/// lose a count. Selection itself remains a separate read; see the
/// rotator for the resulting (accepted) race.
pub async fn record_use(pool: &PgPool, credential_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE provider_credentials
        SET usage_count = usage_count + 1
        WHERE id = $1
        "#,
    )
    .bind(credential_id)
    .execute(pool)
    .await?;

    Ok(())
}
