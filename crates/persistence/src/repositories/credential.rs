//! OAuth credential repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{CredentialProvider, RefreshedToken, UserCredentials};

use crate::entities::OAuthCredentialEntity;

/// Repository for stored upstream OAuth tokens.
#[derive(Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The two tokens an export run needs, in one query.
    pub async fn user_credentials(&self, user_id: Uuid) -> Result<UserCredentials, sqlx::Error> {
        let entities = sqlx::query_as::<_, OAuthCredentialEntity>(
            r#"
            SELECT id, user_id, provider, access_token, refresh_token, expires_at,
                   created_at, updated_at
            FROM oauth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut credentials = UserCredentials::default();
        for entity in entities {
            match CredentialProvider::parse(&entity.provider) {
                Some(CredentialProvider::GoogleSheets) => {
                    credentials.sheets_refresh_token = entity.refresh_token;
                }
                Some(CredentialProvider::FacebookAds) => {
                    credentials.ads_access_token = entity.access_token;
                }
                None => {}
            }
        }

        Ok(credentials)
    }

    /// Persist a refreshed Google token. Keeps the stored refresh token when
    /// the provider did not rotate it.
    pub async fn store_refreshed_token(
        &self,
        user_id: Uuid,
        provider: CredentialProvider,
        token: &RefreshedToken,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE oauth_credentials
            SET access_token = $3,
                refresh_token = COALESCE($4, refresh_token),
                expires_at = $5,
                updated_at = NOW()
            WHERE user_id = $1 AND provider = $2
            "#,
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
