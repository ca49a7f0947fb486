//! Service layer: upstream clients and the export orchestrator.

pub mod ads_provider;
pub mod config_store;
pub mod export_runner;
pub mod sheets;

pub use ads_provider::{AdsDataProvider, FacebookAdsClient};
pub use config_store::{ConfigStore, PgConfigStore};
pub use export_runner::{ExportError, ExportOutcome, ExportRunner, RunSummary};
pub use sheets::{GoogleSheetsClient, SpreadsheetSink};
