//! The export orchestrator.
//!
//! Walks enabled export configurations once per scheduler tick, decides which
//! are due, and runs each due one end to end: credential resolution, Google
//! token refresh, Marketing API fetch, insight merge, row shaping and the
//! spreadsheet write, recording per-config run state afterwards. Configs are
//! processed sequentially; only the per-account fetches inside a single
//! config fan out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use metrics::counter;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::models::{
    AdAccount, ExportConfig, ExportDataType, EntityLevel, ReportFields, RunStateUpdate,
};
use domain::services::{
    column_map, merge::merge_insights, merge::Merged, recurrence, report_date,
    report_date::ReportDate,
};
use shared::a1;

use super::ads_provider::{AdsApiError, AdsDataProvider};
use super::config_store::{ConfigStore, StoreError};
use super::sheets::{SheetsError, SpreadsheetSink};

/// Range wiped before a replace-mode write.
const REPLACE_CLEAR_RANGE: &str = "A:Z";

/// Why a single config's run did not produce a successful write.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export config not found")]
    ConfigNotFound,

    #[error("No Google Sheets refresh token stored for user")]
    MissingSheetsCredential,

    #[error("No Facebook access token stored for user")]
    MissingAdsCredential,

    #[error("Account scope is empty or malformed")]
    EmptyAccountScope,

    #[error("Column mapping has no exportable fields")]
    EmptyColumnMapping,

    #[error("Google token refresh failed: {0}")]
    TokenRefresh(#[source] SheetsError),

    #[error("Ads data fetch failed: {0}")]
    Fetch(#[from] AdsApiError),

    #[error("Spreadsheet write failed: {0}")]
    Spreadsheet(#[source] SheetsError),

    #[error("Config store error: {0}")]
    Store(#[from] StoreError),
}

impl ExportError {
    /// Configuration errors skip the run without touching run state, so the
    /// config is retried on its next due window instead of surfacing as a
    /// failed run the user has to acknowledge.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ExportError::ConfigNotFound
                | ExportError::MissingSheetsCredential
                | ExportError::MissingAdsCredential
                | ExportError::EmptyAccountScope
                | ExportError::EmptyColumnMapping
        )
    }
}

/// Result of one config's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Rows written to the destination sheet.
    Written { rows: usize },
    /// Nothing to export for the target date; nothing written or recorded.
    Empty,
}

/// Tallies for one tick, for the job log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub evaluated: usize,
    pub due: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// One record headed for the spreadsheet, at any entity level.
#[derive(Debug, Clone)]
pub enum ExportRecord {
    Account(AdAccount),
    Campaign(Merged<domain::models::Campaign>),
    AdSet(Merged<domain::models::AdSet>),
    Ad(Merged<domain::models::Ad>),
}

impl ReportFields for ExportRecord {
    fn field(&self, name: &str) -> Option<String> {
        match self {
            ExportRecord::Account(account) => account.field(name),
            ExportRecord::Campaign(merged) => merged.field(name),
            ExportRecord::AdSet(merged) => merged.field(name),
            ExportRecord::Ad(merged) => merged.field(name),
        }
    }
}

/// The orchestrator. Constructed once at startup with its three upstream
/// dependencies injected; owns no other state.
pub struct ExportRunner {
    store: Arc<dyn ConfigStore>,
    ads: Arc<dyn AdsDataProvider>,
    sheets: Arc<dyn SpreadsheetSink>,
}

impl ExportRunner {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        ads: Arc<dyn AdsDataProvider>,
        sheets: Arc<dyn SpreadsheetSink>,
    ) -> Self {
        Self { store, ads, sheets }
    }

    /// One scheduler tick: evaluate every enabled config, run the due ones
    /// sequentially. One config's failure never affects the rest; errors land
    /// in that config's run state and the loop moves on.
    pub async fn run_due_configs(&self, now: DateTime<Utc>) -> Result<RunSummary, StoreError> {
        let configs = self.store.list_enabled_configs().await?;
        let mut summary = RunSummary {
            evaluated: configs.len(),
            ..RunSummary::default()
        };

        for config in &configs {
            if !recurrence::is_due(config, now) {
                continue;
            }
            summary.due += 1;

            match self.run_config(config, now, false).await {
                Ok(ExportOutcome::Written { rows }) => {
                    summary.succeeded += 1;
                    counter!("export_runs_total", "status" => "success").increment(1);
                    info!(config_id = %config.id, rows, "Export completed");
                    self.record_state(config.id, RunStateUpdate::success(now, rows as i64))
                        .await;
                }
                Ok(ExportOutcome::Empty) => {
                    summary.skipped += 1;
                    counter!("export_runs_total", "status" => "empty").increment(1);
                    info!(config_id = %config.id, "No data for target date, skipping write");
                }
                Err(err) if err.is_config_error() => {
                    summary.skipped += 1;
                    counter!("export_runs_total", "status" => "skipped").increment(1);
                    warn!(config_id = %config.id, error = %err, "Export skipped");
                }
                Err(err) => {
                    summary.failed += 1;
                    counter!("export_runs_total", "status" => "failed").increment(1);
                    error!(config_id = %config.id, error = %err, "Export failed");
                    self.record_state(config.id, RunStateUpdate::failure(now, err.to_string()))
                        .await;
                }
            }
        }

        Ok(summary)
    }

    /// On-demand export of a single config, regardless of schedule. Prefixes
    /// the data with an untrimmed header row so ad-hoc sheets are
    /// self-describing.
    pub async fn run_interactive(
        &self,
        config_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ExportOutcome, ExportError> {
        let config = self
            .store
            .find_config(config_id)
            .await?
            .ok_or(ExportError::ConfigNotFound)?;

        let outcome = self.run_config(&config, now, true).await;
        match &outcome {
            Ok(ExportOutcome::Written { rows }) => {
                self.record_state(config.id, RunStateUpdate::success(now, *rows as i64))
                    .await;
            }
            Ok(ExportOutcome::Empty) => {}
            Err(err) if err.is_config_error() => {}
            Err(err) => {
                self.record_state(config.id, RunStateUpdate::failure(now, err.to_string()))
                    .await;
            }
        }
        outcome
    }

    /// One config end to end, from credentials to the sheet write. Does not
    /// touch run state; callers decide how to record the outcome.
    async fn run_config(
        &self,
        config: &ExportConfig,
        now: DateTime<Utc>,
        with_header: bool,
    ) -> Result<ExportOutcome, ExportError> {
        // Credentials for both upstreams, before doing any work.
        let credentials = self.store.user_credentials(config.user_id).await?;
        let sheets_refresh = credentials
            .sheets_refresh_token
            .ok_or(ExportError::MissingSheetsCredential)?;
        let ads_token = credentials
            .ads_access_token
            .ok_or(ExportError::MissingAdsCredential)?;

        // Fresh Google access token; persist it so the next run (and the
        // interactive UI) start from the newest pair.
        let sheets_token = self
            .sheets
            .refresh_access_token(&sheets_refresh)
            .await
            .map_err(ExportError::TokenRefresh)?;
        self.store
            .store_sheets_token(config.user_id, &sheets_token)
            .await?;

        if config.account_ids.is_empty() {
            return Err(ExportError::EmptyAccountScope);
        }
        if config.column_mapping.is_empty() {
            return Err(ExportError::EmptyColumnMapping);
        }

        let timezone = config
            .use_account_timezone
            .then_some(config.account_timezone.as_deref())
            .flatten();
        let date = report_date::yesterday(now, timezone);

        let records = self.fetch_records(&ads_token, config, &date).await?;
        if records.is_empty() {
            return Ok(ExportOutcome::Empty);
        }

        let date_cell = config.include_date.then_some(date.display_date.as_str());
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(records.len() + 1);
        if with_header {
            rows.push(column_map::header_row(
                &config.column_mapping,
                config.include_date,
            ));
        }
        rows.extend(records.iter().map(|record| {
            column_map::trim_trailing_empty(column_map::map_to_row(
                record,
                &config.column_mapping,
                date_cell,
            ))
        }));
        let data_rows = records.len();

        self.write_rows(&sheets_token.access_token, config, &rows)
            .await?;

        Ok(ExportOutcome::Written { rows: data_rows })
    }

    /// Fetches and merges the records for one config. Per-account fetches run
    /// concurrently; any account's failure fails the whole job rather than
    /// silently exporting a partial sheet.
    async fn fetch_records(
        &self,
        token: &str,
        config: &ExportConfig,
        date: &ReportDate,
    ) -> Result<Vec<ExportRecord>, ExportError> {
        let since = date.api_date.as_str();
        let until = date.api_date.as_str();
        let accounts = &config.account_ids;

        let records = match config.data_type {
            ExportDataType::AdAccounts => {
                let all = self.ads.list_ad_accounts(token).await?;
                all.into_iter()
                    .filter(|account| {
                        accounts
                            .iter()
                            .any(|id| account.id == *id || account.id == format!("act_{id}"))
                    })
                    .map(ExportRecord::Account)
                    .collect()
            }
            ExportDataType::Campaigns => {
                let per_account = accounts.iter().map(|account_id| async move {
                    let (entities, insights) = tokio::try_join!(
                        self.ads.list_campaigns(token, account_id),
                        self.ads
                            .fetch_insights(token, account_id, EntityLevel::Campaign, since, until)
                    )?;
                    Ok::<_, AdsApiError>(merge_insights(entities, insights))
                });
                try_join_all(per_account)
                    .await?
                    .into_iter()
                    .flatten()
                    .map(ExportRecord::Campaign)
                    .collect()
            }
            ExportDataType::AdSets => {
                let per_account = accounts.iter().map(|account_id| async move {
                    let (entities, insights) = tokio::try_join!(
                        self.ads.list_ad_sets(token, account_id),
                        self.ads
                            .fetch_insights(token, account_id, EntityLevel::AdSet, since, until)
                    )?;
                    Ok::<_, AdsApiError>(merge_insights(entities, insights))
                });
                try_join_all(per_account)
                    .await?
                    .into_iter()
                    .flatten()
                    .map(ExportRecord::AdSet)
                    .collect()
            }
            ExportDataType::Ads => {
                let per_account = accounts.iter().map(|account_id| async move {
                    let (entities, insights) = tokio::try_join!(
                        self.ads.list_ads(token, account_id),
                        self.ads
                            .fetch_insights(token, account_id, EntityLevel::Ad, since, until)
                    )?;
                    Ok::<_, AdsApiError>(merge_insights(entities, insights))
                });
                try_join_all(per_account)
                    .await?
                    .into_iter()
                    .flatten()
                    .map(ExportRecord::Ad)
                    .collect()
            }
        };

        Ok(records)
    }

    /// Append after existing content, or clear-and-rewrite from the top.
    async fn write_rows(
        &self,
        access_token: &str,
        config: &ExportConfig,
        rows: &[Vec<String>],
    ) -> Result<(), ExportError> {
        if config.append_mode {
            // Column A's extent tells us where the sheet ends.
            let existing = self
                .sheets
                .read_column(access_token, &config.spreadsheet_id, &config.sheet_name, "A")
                .await
                .map_err(ExportError::Spreadsheet)?;
            let start = a1::cell(0, existing.len() as u32 + 1);
            self.sheets
                .write_rows(
                    access_token,
                    &config.spreadsheet_id,
                    &config.sheet_name,
                    &start,
                    rows,
                )
                .await
                .map_err(ExportError::Spreadsheet)?;
        } else {
            // Best-effort clear; an already-empty sheet may refuse it.
            if let Err(err) = self
                .sheets
                .clear_range(
                    access_token,
                    &config.spreadsheet_id,
                    &config.sheet_name,
                    REPLACE_CLEAR_RANGE,
                )
                .await
            {
                warn!(config_id = %config.id, error = %err, "Clear before replace failed, writing anyway");
            }
            self.sheets
                .write_rows(
                    access_token,
                    &config.spreadsheet_id,
                    &config.sheet_name,
                    "A1",
                    rows,
                )
                .await
                .map_err(ExportError::Spreadsheet)?;
        }

        Ok(())
    }

    /// Run-state writes are bookkeeping; their failure is logged, never
    /// allowed to abort the batch.
    async fn record_state(&self, config_id: Uuid, update: RunStateUpdate) {
        if let Err(err) = self.store.record_run_state(config_id, update).await {
            error!(config_id = %config_id, error = %err, "Failed to record run state");
        }
    }
}
