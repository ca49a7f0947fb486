//! Google Sheets client: OAuth token refresh and spreadsheet reads/writes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use domain::models::RefreshedToken;

use crate::config::GoogleConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Sheets API or the OAuth token endpoint.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token refresh rejected: {0}")]
    TokenRefresh(String),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from Sheets API: {0}")]
    InvalidResponse(String),
}

/// Write access to a spreadsheet, plus the token refresh the writes need.
#[async_trait]
pub trait SpreadsheetSink: Send + Sync {
    /// Exchange a stored refresh token for a fresh access token.
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<RefreshedToken, SheetsError>;

    /// Cell values of one column (`"A"`), outer vec per row. Used to find the
    /// first empty row before an append.
    async fn read_column(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        column: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Write rows starting at `start_cell` (e.g. `"A5"`).
    async fn write_rows(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        start_cell: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError>;

    /// Clear a range (e.g. `"A:Z"`).
    async fn clear_range(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        range: &str,
    ) -> Result<(), SheetsError>;
}

/// Production client against the Sheets v4 API.
pub struct GoogleSheetsClient {
    http: Client,
    sheets_base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleSheetsClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SheetsError::Http)?;

        Ok(Self {
            http,
            sheets_base_url: config.sheets_base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.sheets_base_url, spreadsheet_id, range
        )
    }

    async fn check_api_error(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<SheetsErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SpreadsheetSink for GoogleSheetsClient {
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedToken, SheetsError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SheetsError::TokenRefresh(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))?;

        Ok(RefreshedToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    async fn read_column(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        column: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let range = format!("{sheet}!{column}:{column}");
        let response = self
            .http
            .get(self.values_url(spreadsheet_id, &range))
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = Self::check_api_error(response).await?;

        let values: ValuesResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(e.to_string()))?;
        Ok(values.values)
    }

    async fn write_rows(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        start_cell: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let range = format!("{sheet}!{start_cell}");
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(spreadsheet_id, &range)
        );

        let response = self
            .http
            .put(url)
            .bearer_auth(access_token)
            .json(&json!({ "range": range, "values": rows }))
            .send()
            .await?;
        Self::check_api_error(response).await?;

        debug!(spreadsheet_id, range = %range, rows = rows.len(), "Wrote spreadsheet rows");
        Ok(())
    }

    async fn clear_range(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        sheet: &str,
        range: &str,
    ) -> Result<(), SheetsError> {
        let url = format!("{}:clear", self.values_url(spreadsheet_id, &format!("{sheet}!{range}")));
        let response = self.http.post(url).bearer_auth(access_token).send().await?;
        Self::check_api_error(response).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    /// Absent entirely when the range is empty.
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SheetsErrorEnvelope {
    error: SheetsErrorBody,
}

#[derive(Debug, Deserialize)]
struct SheetsErrorBody {
    message: String,
}
