//! Domain models for the Ads Exporter backend.

pub mod ad_entity;
pub mod credentials;
pub mod export_config;
pub mod insights;

pub use ad_entity::{Ad, AdAccount, AdSet, Campaign, EntityLevel, ReportFields};
pub use credentials::{CredentialProvider, RefreshedToken, RunStateUpdate, UserCredentials};
pub use export_config::{
    parse_account_scope, ColumnMapping, CreateExportConfig, ExportConfig, ExportDataType,
    ExportFrequency, RunStatus, UpdateExportConfig, SKIP_COLUMN,
};
pub use insights::InsightRow;
