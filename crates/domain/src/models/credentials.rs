//! Stored OAuth credentials and run-state bookkeeping types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::export_config::RunStatus;

/// OAuth provider a stored credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialProvider {
    GoogleSheets,
    FacebookAds,
}

impl CredentialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialProvider::GoogleSheets => "google_sheets",
            CredentialProvider::FacebookAds => "facebook_ads",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google_sheets" => Some(CredentialProvider::GoogleSheets),
            "facebook_ads" => Some(CredentialProvider::FacebookAds),
            _ => None,
        }
    }
}

/// The two upstream credentials a scheduled export needs.
#[derive(Debug, Clone, Default)]
pub struct UserCredentials {
    /// Google refresh token; exports cannot run without it.
    pub sheets_refresh_token: Option<String>,
    /// Facebook access token; exports cannot run without it.
    pub ads_access_token: Option<String>,
}

/// A freshly minted access token from the OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    /// Some providers rotate the refresh token on use.
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Run-state fields written back to a config after a run attempt.
#[derive(Debug, Clone)]
pub struct RunStateUpdate {
    pub ran_at: DateTime<Utc>,
    pub status: RunStatus,
    pub rows: Option<i64>,
    pub error: Option<String>,
}

impl RunStateUpdate {
    pub fn success(ran_at: DateTime<Utc>, rows: i64) -> Self {
        Self {
            ran_at,
            status: RunStatus::Success,
            rows: Some(rows),
            error: None,
        }
    }

    pub fn failure(ran_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            ran_at,
            status: RunStatus::Failed,
            rows: None,
            error: Some(error.into()),
        }
    }
}
