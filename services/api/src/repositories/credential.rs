//! Platform credential repository
//!
//! One credential row per user; a re-authorization overwrites the stored
//! tokens in place.

use anyhow::Result;
use common::models::Credential;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Credential repository
#[derive(Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    /// Create a new credential repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store the user's platform tokens, replacing any previous ones
    pub async fn upsert(
        &self,
        user_id: Uuid,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<Credential> {
        info!("Storing platform credential for user: {}", user_id);

        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (user_id, access_token, refresh_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET access_token = EXCLUDED.access_token,
                    refresh_token = EXCLUDED.refresh_token,
                    updated_at = NOW()
            RETURNING user_id, access_token, refresh_token, updated_at
            "#,
        )
        .bind(user_id)
        .bind(access_token)
        .bind(refresh_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(credential)
    }

    /// Find the stored credential for a user
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, access_token, refresh_token, updated_at
            FROM credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }
}
