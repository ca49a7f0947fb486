//! Persistence boundary for the export runner.
//!
//! The runner only sees this trait, so orchestration tests run against an
//! in-memory store and the production wiring stays a thin pass-through to the
//! repositories.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{
    CredentialProvider, ExportConfig, RefreshedToken, RunStateUpdate, UserCredentials,
};
use persistence::repositories::{CredentialRepository, ExportConfigRepository};

/// Error from the config store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What the export runner needs from persistence.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Enabled export configurations, the per-tick working set.
    async fn list_enabled_configs(&self) -> Result<Vec<ExportConfig>, StoreError>;

    /// A single configuration, for interactive runs.
    async fn find_config(&self, id: Uuid) -> Result<Option<ExportConfig>, StoreError>;

    /// Record the outcome of a run attempt.
    async fn record_run_state(&self, id: Uuid, update: RunStateUpdate) -> Result<(), StoreError>;

    /// The owning user's upstream credentials.
    async fn user_credentials(&self, user_id: Uuid) -> Result<UserCredentials, StoreError>;

    /// Persist a refreshed Google access token.
    async fn store_sheets_token(
        &self,
        user_id: Uuid,
        token: &RefreshedToken,
    ) -> Result<(), StoreError>;
}

/// Production store backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgConfigStore {
    configs: ExportConfigRepository,
    credentials: CredentialRepository,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            configs: ExportConfigRepository::new(pool.clone()),
            credentials: CredentialRepository::new(pool),
        }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn list_enabled_configs(&self) -> Result<Vec<ExportConfig>, StoreError> {
        Ok(self.configs.list_enabled().await?)
    }

    async fn find_config(&self, id: Uuid) -> Result<Option<ExportConfig>, StoreError> {
        Ok(self.configs.find_by_id(id).await?)
    }

    async fn record_run_state(&self, id: Uuid, update: RunStateUpdate) -> Result<(), StoreError> {
        self.configs.update_run_state(id, &update).await?;
        Ok(())
    }

    async fn user_credentials(&self, user_id: Uuid) -> Result<UserCredentials, StoreError> {
        Ok(self.credentials.user_credentials(user_id).await?)
    }

    async fn store_sheets_token(
        &self,
        user_id: Uuid,
        token: &RefreshedToken,
    ) -> Result<(), StoreError> {
        self.credentials
            .store_refreshed_token(user_id, CredentialProvider::GoogleSheets, token)
            .await?;
        Ok(())
    }
}
