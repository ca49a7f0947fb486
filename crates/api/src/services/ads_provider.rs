//! Facebook Marketing API client.
//!
//! Read-only Graph API access: ad accounts, campaign/ad-set/ad listings and
//! the insights endpoint. Cursor pagination (`paging.next`) is followed until
//! exhausted, so callers always see complete result sets.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use domain::models::{Ad, AdAccount, AdSet, Campaign, EntityLevel, InsightRow};

use crate::config::FacebookConfig;

const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Marketing API.
#[derive(Debug, Error)]
pub enum AdsApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Graph API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Invalid response from Graph API: {0}")]
    InvalidResponse(String),
}

/// Read access to ads data, at the granularity the export runner needs.
#[async_trait]
pub trait AdsDataProvider: Send + Sync {
    /// All ad accounts the token can see.
    async fn list_ad_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, AdsApiError>;

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, AdsApiError>;

    async fn list_ad_sets(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<AdSet>, AdsApiError>;

    async fn list_ads(&self, access_token: &str, account_id: &str)
        -> Result<Vec<Ad>, AdsApiError>;

    /// Performance metrics for one account, one level, one closed date range.
    async fn fetch_insights(
        &self,
        access_token: &str,
        account_id: &str,
        level: EntityLevel,
        since: &str,
        until: &str,
    ) -> Result<Vec<InsightRow>, AdsApiError>;
}

/// Production client against the Graph API.
pub struct FacebookAdsClient {
    http: Client,
    base_url: String,
}

impl FacebookAdsClient {
    pub fn new(config: &FacebookConfig) -> Result<Self, AdsApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AdsApiError::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Follows `paging.next` until the listing is exhausted.
    async fn fetch_paged<T: DeserializeOwned>(
        &self,
        first_url: String,
    ) -> Result<Vec<T>, AdsApiError> {
        let mut results = Vec::new();
        let mut url = Some(first_url);
        let mut pages = 0u32;

        while let Some(next) = url.take() {
            let response = self.http.get(&next).send().await?;
            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                return Err(parse_graph_error(status.as_u16(), &body));
            }

            let page: GraphPage<T> = serde_json::from_str(&body)
                .map_err(|e| AdsApiError::InvalidResponse(e.to_string()))?;

            results.extend(page.data);
            url = page.paging.and_then(|p| p.next);
            pages += 1;
        }

        debug!(pages, records = results.len(), "Fetched Graph listing");
        Ok(results)
    }

    fn listing_url(&self, account_id: &str, edge: &str, fields: &str, token: &str) -> String {
        format!(
            "{}/{}/{}?fields={}&limit={}&access_token={}",
            self.base_url,
            act_path(account_id),
            edge,
            fields,
            PAGE_SIZE,
            token
        )
    }
}

#[async_trait]
impl AdsDataProvider for FacebookAdsClient {
    async fn list_ad_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, AdsApiError> {
        let url = format!(
            "{}/me/adaccounts?fields=id,name,account_status,currency,timezone_name,amount_spent,spend_cap&limit={}&access_token={}",
            self.base_url, PAGE_SIZE, access_token
        );
        let accounts: Vec<AdAccountWire> = self.fetch_paged(url).await?;
        Ok(accounts.into_iter().map(AdAccount::from).collect())
    }

    async fn list_campaigns(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Campaign>, AdsApiError> {
        let url = self.listing_url(
            account_id,
            "campaigns",
            "id,name,status,objective,daily_budget,lifetime_budget,created_time",
            access_token,
        );
        let campaigns: Vec<Campaign> = self.fetch_paged(url).await?;
        Ok(campaigns)
    }

    async fn list_ad_sets(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<AdSet>, AdsApiError> {
        let url = self.listing_url(
            account_id,
            "adsets",
            "id,name,status,campaign_id,daily_budget,lifetime_budget,optimization_goal,billing_event",
            access_token,
        );
        let ad_sets: Vec<AdSet> = self.fetch_paged(url).await?;
        Ok(ad_sets)
    }

    async fn list_ads(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<Vec<Ad>, AdsApiError> {
        let url = self.listing_url(
            account_id,
            "ads",
            "id,name,status,adset_id,campaign_id,created_time",
            access_token,
        );
        let ads: Vec<Ad> = self.fetch_paged(url).await?;
        Ok(ads)
    }

    async fn fetch_insights(
        &self,
        access_token: &str,
        account_id: &str,
        level: EntityLevel,
        since: &str,
        until: &str,
    ) -> Result<Vec<InsightRow>, AdsApiError> {
        let id_field = match level {
            EntityLevel::Campaign => "campaign_id",
            EntityLevel::AdSet => "adset_id",
            EntityLevel::Ad => "ad_id",
        };
        let time_range = format!("{{\"since\":\"{since}\",\"until\":\"{until}\"}}");
        let url = format!(
            "{}/{}/insights?level={}&fields={},impressions,clicks,spend,reach,ctr,cpc,cpm,frequency&time_range={}&limit={}&access_token={}",
            self.base_url,
            act_path(account_id),
            level.as_str(),
            id_field,
            time_range,
            PAGE_SIZE,
            access_token
        );

        let rows: Vec<InsightWire> = self.fetch_paged(url).await?;
        rows.into_iter()
            .map(|row| row.into_domain(level))
            .collect()
    }
}

/// Config rows store bare numeric ids; Graph paths want the `act_` prefix.
fn act_path(account_id: &str) -> String {
    if account_id.starts_with("act_") {
        account_id.to_string()
    } else {
        format!("act_{account_id}")
    }
}

fn parse_graph_error(status: u16, body: &str) -> AdsApiError {
    match serde_json::from_str::<GraphErrorEnvelope>(body) {
        Ok(envelope) => AdsApiError::Api {
            code: envelope.error.code.unwrap_or(status as i64),
            message: envelope.error.message,
        },
        Err(_) => AdsApiError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct GraphPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    paging: Option<GraphPaging>,
}

#[derive(Debug, Deserialize)]
struct GraphPaging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
    code: Option<i64>,
}

/// Ad account as the Graph API returns it; `account_status` is numeric.
#[derive(Debug, Deserialize)]
struct AdAccountWire {
    id: String,
    #[serde(default)]
    name: String,
    account_status: Option<i64>,
    currency: Option<String>,
    timezone_name: Option<String>,
    amount_spent: Option<String>,
    spend_cap: Option<String>,
}

impl From<AdAccountWire> for AdAccount {
    fn from(wire: AdAccountWire) -> Self {
        AdAccount {
            id: wire.id,
            name: wire.name,
            account_status: wire.account_status.map(|s| s.to_string()),
            currency: wire.currency,
            timezone_name: wire.timezone_name,
            amount_spent: wire.amount_spent,
            spend_cap: wire.spend_cap,
        }
    }
}

/// One insights row; the level-specific id column is normalized onto
/// `InsightRow.id` so merging is level-agnostic downstream.
#[derive(Debug, Deserialize)]
struct InsightWire {
    campaign_id: Option<String>,
    adset_id: Option<String>,
    ad_id: Option<String>,
    impressions: Option<String>,
    clicks: Option<String>,
    spend: Option<String>,
    reach: Option<String>,
    ctr: Option<String>,
    cpc: Option<String>,
    cpm: Option<String>,
    frequency: Option<String>,
    date_start: Option<String>,
    date_stop: Option<String>,
}

impl InsightWire {
    fn into_domain(self, level: EntityLevel) -> Result<InsightRow, AdsApiError> {
        let id = match level {
            EntityLevel::Campaign => self.campaign_id,
            EntityLevel::AdSet => self.adset_id,
            EntityLevel::Ad => self.ad_id,
        }
        .ok_or_else(|| {
            AdsApiError::InvalidResponse(format!(
                "insights row missing {} id",
                level.as_str()
            ))
        })?;

        Ok(InsightRow {
            id,
            impressions: self.impressions,
            clicks: self.clicks,
            spend: self.spend,
            reach: self.reach,
            ctr: self.ctr,
            cpc: self.cpc,
            cpm: self.cpm,
            frequency: self.frequency,
            date_start: self.date_start,
            date_stop: self.date_stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_act_path_prefixing() {
        assert_eq!(act_path("123"), "act_123");
        assert_eq!(act_path("act_123"), "act_123");
    }

    #[test]
    fn test_graph_error_parsing() {
        let body = r#"{"error":{"message":"Invalid OAuth access token.","type":"OAuthException","code":190}}"#;
        match parse_graph_error(400, body) {
            AdsApiError::Api { code, message } => {
                assert_eq!(code, 190);
                assert!(message.contains("OAuth"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            parse_graph_error(500, "<html>gateway</html>"),
            AdsApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_page_deserialization() {
        let body = r#"{"data":[{"id":"act_1","name":"Main","account_status":1}],"paging":{"cursors":{"before":"b","after":"a"},"next":"https://graph/next"}}"#;
        let page: GraphPage<AdAccountWire> = serde_json::from_str(body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.paging.unwrap().next.as_deref(), Some("https://graph/next"));

        let account = AdAccount::from(page.data.into_iter().next().unwrap());
        assert_eq!(account.account_status.as_deref(), Some("1"));
    }

    #[test]
    fn test_insight_wire_id_normalization() {
        let body = r#"{"campaign_id":"42","spend":"10.5","impressions":"1000"}"#;
        let wire: InsightWire = serde_json::from_str(body).unwrap();
        let row = wire.into_domain(EntityLevel::Campaign).unwrap();
        assert_eq!(row.id, "42");

        let wire: InsightWire = serde_json::from_str(body).unwrap();
        assert!(wire.into_domain(EntityLevel::Ad).is_err());
    }
}
