//! Export configuration domain model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::a1;

/// Mapping target meaning "leave this field out of the export".
pub const SKIP_COLUMN: &str = "skip";

/// Which Marketing API objects an export pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportDataType {
    AdAccounts,
    Campaigns,
    AdSets,
    Ads,
}

impl ExportDataType {
    /// Stable string form used in the database and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportDataType::AdAccounts => "ad-accounts",
            ExportDataType::Campaigns => "campaigns",
            ExportDataType::AdSets => "ad-sets",
            ExportDataType::Ads => "ads",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ad-accounts" => Some(ExportDataType::AdAccounts),
            "campaigns" => Some(ExportDataType::Campaigns),
            "ad-sets" => Some(ExportDataType::AdSets),
            "ads" => Some(ExportDataType::Ads),
            _ => None,
        }
    }
}

/// How often a configured export recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFrequency {
    Daily,
    Hourly,
}

impl ExportFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFrequency::Daily => "daily",
            ExportFrequency::Hourly => "hourly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(ExportFrequency::Daily),
            "hourly" => Some(ExportFrequency::Hourly),
            _ => None,
        }
    }
}

/// Outcome of the most recent run of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(RunStatus::Success),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }
}

/// User-defined `field -> column letter` mapping.
///
/// The letter space (`"A"`, `"K"`, `"skip"`) is the external convention;
/// [`ColumnMapping::targets`] converts to 0-based indices once so all row
/// manipulation happens in integer space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(pub HashMap<String, String>);

impl ColumnMapping {
    /// Resolved `(field, column index)` pairs.
    ///
    /// Skip entries and unparsable column letters are dropped; a mapping that
    /// resolves to nothing renders the config unrunnable and is rejected at
    /// create/update time.
    pub fn targets(&self) -> Vec<(&str, usize)> {
        let mut targets: Vec<(&str, usize)> = self
            .0
            .iter()
            .filter(|(_, letter)| !letter.eq_ignore_ascii_case(SKIP_COLUMN))
            .filter_map(|(field, letter)| {
                a1::column_index(letter).ok().map(|idx| (field.as_str(), idx))
            })
            .collect();
        targets.sort_by_key(|(_, idx)| *idx);
        targets
    }

    /// Highest mapped column index, if any field maps to a real column.
    pub fn max_index(&self) -> Option<usize> {
        self.targets().into_iter().map(|(_, idx)| idx).max()
    }

    /// True when no field maps to a real column.
    pub fn is_empty(&self) -> bool {
        self.targets().is_empty()
    }

    /// Parses a mapping from its stored JSON form. Malformed JSON degrades to
    /// an empty mapping rather than failing the row load.
    pub fn from_json(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// A persisted export configuration, one row in the config store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportConfig {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub data_type: ExportDataType,

    /// Destination spreadsheet and tab.
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub sheet_name: String,

    pub column_mapping: ColumnMapping,
    /// Prefix each row with the report date in column A.
    pub include_date: bool,
    /// Append after existing content instead of clearing and rewriting.
    pub append_mode: bool,

    /// Source ad account ids in scope for this export.
    pub account_ids: Vec<String>,

    pub enabled: bool,
    pub frequency: ExportFrequency,
    /// Target time of day for daily exports.
    pub export_hour: u32,
    pub export_minute: u32,
    /// Hours between runs for hourly exports.
    pub export_interval_hours: Option<i64>,
    /// Evaluate the daily schedule in the source account's timezone.
    pub use_account_timezone: bool,
    /// Cached IANA timezone of the source account, e.g. `America/New_York`.
    pub account_timezone: Option<String>,

    pub last_run_at: Option<DateTime<Utc>>,
    pub last_run_status: Option<RunStatus>,
    pub last_run_rows: Option<i64>,
    pub last_run_error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parses the stored account scope tolerantly.
///
/// Accepts a JSON array of strings or a single JSON string; anything else
/// (including malformed JSON) degrades to an empty scope, which the runner
/// treats as "skip this config", never as an error.
pub fn parse_account_scope(raw: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Ok(serde_json::Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    }
}

/// Request payload for creating an export configuration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateExportConfig {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub data_type: ExportDataType,

    #[validate(length(min = 1, message = "Spreadsheet id is required"))]
    pub spreadsheet_id: String,

    #[serde(default)]
    pub spreadsheet_name: String,

    #[validate(length(min = 1, message = "Sheet name is required"))]
    pub sheet_name: String,

    #[validate(custom(function = "validate_column_mapping"))]
    pub column_mapping: ColumnMapping,

    #[serde(default)]
    pub include_date: bool,

    #[serde(default = "default_append_mode")]
    pub append_mode: bool,

    #[serde(default)]
    pub account_ids: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub frequency: ExportFrequency,

    #[validate(range(max = 23, message = "Hour must be 0-23"))]
    #[serde(default)]
    pub export_hour: u32,

    #[validate(range(max = 59, message = "Minute must be 0-59"))]
    #[serde(default)]
    pub export_minute: u32,

    #[validate(range(min = 1, message = "Interval must be at least 1 hour"))]
    pub export_interval_hours: Option<i64>,

    #[serde(default)]
    pub use_account_timezone: bool,

    pub account_timezone: Option<String>,
}

/// Request payload for updating an export configuration. All fields optional;
/// absent fields keep their stored value.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateExportConfig {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub data_type: Option<ExportDataType>,
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_name: Option<String>,
    pub sheet_name: Option<String>,

    #[validate(custom(function = "validate_column_mapping"))]
    pub column_mapping: Option<ColumnMapping>,

    pub include_date: Option<bool>,
    pub append_mode: Option<bool>,
    pub account_ids: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub frequency: Option<ExportFrequency>,

    #[validate(range(max = 23, message = "Hour must be 0-23"))]
    pub export_hour: Option<u32>,

    #[validate(range(max = 59, message = "Minute must be 0-59"))]
    pub export_minute: Option<u32>,

    #[validate(range(min = 1, message = "Interval must be at least 1 hour"))]
    pub export_interval_hours: Option<i64>,

    pub use_account_timezone: Option<bool>,
    pub account_timezone: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_append_mode() -> bool {
    true
}

/// At least one field must map to a real column.
fn validate_column_mapping(mapping: &ColumnMapping) -> Result<(), validator::ValidationError> {
    if mapping.is_empty() {
        let mut err = validator::ValidationError::new("empty_mapping");
        err.message = Some("Column mapping needs at least one non-skip entry".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_targets_resolve_and_sort() {
        let mapping = ColumnMapping(HashMap::from([
            ("spend".to_string(), "K".to_string()),
            ("name".to_string(), "B".to_string()),
            ("clicks".to_string(), "skip".to_string()),
        ]));

        assert_eq!(mapping.targets(), vec![("name", 1), ("spend", 10)]);
        assert_eq!(mapping.max_index(), Some(10));
        assert!(!mapping.is_empty());
    }

    #[test]
    fn test_mapping_ignores_bad_letters() {
        let mapping = ColumnMapping(HashMap::from([
            ("spend".to_string(), "$".to_string()),
            ("name".to_string(), "skip".to_string()),
        ]));
        assert!(mapping.is_empty());
        assert_eq!(mapping.max_index(), None);
    }

    #[test]
    fn test_mapping_from_malformed_json_is_empty() {
        let mapping = ColumnMapping::from_json(&json!(["not", "a", "map"]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_parse_account_scope_array() {
        assert_eq!(
            parse_account_scope(r#"["123","456"]"#),
            vec!["123".to_string(), "456".to_string()]
        );
    }

    #[test]
    fn test_parse_account_scope_single_string() {
        assert_eq!(parse_account_scope(r#""123""#), vec!["123".to_string()]);
    }

    #[test]
    fn test_parse_account_scope_malformed_degrades_to_empty() {
        assert!(parse_account_scope("not json").is_empty());
        assert!(parse_account_scope("{\"a\":1}").is_empty());
        assert!(parse_account_scope("").is_empty());
    }

    #[test]
    fn test_data_type_round_trip() {
        for dt in [
            ExportDataType::AdAccounts,
            ExportDataType::Campaigns,
            ExportDataType::AdSets,
            ExportDataType::Ads,
        ] {
            assert_eq!(ExportDataType::parse(dt.as_str()), Some(dt));
        }
        assert_eq!(ExportDataType::parse("bogus"), None);
    }

    #[test]
    fn test_create_request_validation() {
        let valid = CreateExportConfig {
            user_id: Uuid::new_v4(),
            name: "Daily campaigns".to_string(),
            data_type: ExportDataType::Campaigns,
            spreadsheet_id: "sheet-1".to_string(),
            spreadsheet_name: String::new(),
            sheet_name: "Sheet1".to_string(),
            column_mapping: ColumnMapping(HashMap::from([(
                "name".to_string(),
                "A".to_string(),
            )])),
            include_date: true,
            append_mode: true,
            account_ids: vec!["123".to_string()],
            enabled: true,
            frequency: ExportFrequency::Daily,
            export_hour: 9,
            export_minute: 0,
            export_interval_hours: None,
            use_account_timezone: false,
            account_timezone: None,
        };
        assert!(valid.validate().is_ok());

        let mut bad_hour = valid.clone();
        bad_hour.export_hour = 24;
        assert!(bad_hour.validate().is_err());

        let mut all_skip = valid.clone();
        all_skip.column_mapping =
            ColumnMapping(HashMap::from([("name".to_string(), "skip".to_string())]));
        assert!(all_skip.validate().is_err());
    }
}
