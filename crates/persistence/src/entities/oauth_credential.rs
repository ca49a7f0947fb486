//! Stored OAuth credential entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for per-user upstream OAuth tokens, one row per provider.
#[derive(Debug, Clone, FromRow)]
pub struct OAuthCredentialEntity {
    pub id: Uuid,
    pub user_id: Uuid,

    /// `google_sheets` or `facebook_ads`.
    pub provider: String,

    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
