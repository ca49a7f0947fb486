//! Export configuration entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for export configurations.
///
/// Enum-like columns are stored as text and parsed into domain enums during
/// conversion; `column_mapping` is JSONB and `account_ids` a JSON-serialized
/// text column, both parsed tolerantly so one bad row never poisons a batch
/// load.
#[derive(Debug, Clone, FromRow)]
pub struct ExportConfigEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,

    /// One of `ad-accounts`, `campaigns`, `ad-sets`, `ads`.
    pub data_type: String,

    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub sheet_name: String,

    /// `field -> column letter` mapping.
    pub column_mapping: serde_json::Value,
    pub include_date: bool,
    pub append_mode: bool,

    /// JSON-serialized list of source account ids.
    pub account_ids: String,

    pub enabled: bool,

    /// `daily` or `hourly`.
    pub frequency: String,
    pub export_hour: i32,
    pub export_minute: i32,
    pub export_interval_hours: Option<i64>,
    pub use_account_timezone: bool,
    pub account_timezone: Option<String>,

    pub last_run_at: Option<DateTime<Utc>>,
    /// `success` or `failed`.
    pub last_run_status: Option<String>,
    pub last_run_rows: Option<i64>,
    pub last_run_error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_construction() {
        let now = Utc::now();
        let entity = ExportConfigEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Daily campaigns".to_string(),
            data_type: "campaigns".to_string(),
            spreadsheet_id: "sheet-1".to_string(),
            spreadsheet_name: "Performance".to_string(),
            sheet_name: "Sheet1".to_string(),
            column_mapping: serde_json::json!({"name": "B", "spend": "K"}),
            include_date: true,
            append_mode: true,
            account_ids: r#"["123"]"#.to_string(),
            enabled: true,
            frequency: "daily".to_string(),
            export_hour: 9,
            export_minute: 0,
            export_interval_hours: None,
            use_account_timezone: false,
            account_timezone: None,
            last_run_at: None,
            last_run_status: None,
            last_run_rows: None,
            last_run_error: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(entity.frequency, "daily");
        assert!(entity.last_run_status.is_none());
    }
}
