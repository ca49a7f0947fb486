//! Export configuration repository for database operations.

use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use domain::models::{
    parse_account_scope, ColumnMapping, CreateExportConfig, ExportConfig, ExportDataType,
    ExportFrequency, RunStateUpdate, RunStatus, UpdateExportConfig,
};

use crate::entities::ExportConfigEntity;

const SELECT_COLUMNS: &str = r#"
    id, user_id, name, data_type, spreadsheet_id, spreadsheet_name, sheet_name,
    column_mapping, include_date, append_mode, account_ids, enabled, frequency,
    export_hour, export_minute, export_interval_hours, use_account_timezone,
    account_timezone, last_run_at, last_run_status, last_run_rows, last_run_error,
    created_at, updated_at
"#;

/// Repository for export configuration database operations.
#[derive(Clone)]
pub struct ExportConfigRepository {
    pool: PgPool,
}

impl ExportConfigRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All configurations, newest first. Serves the listing endpoint.
    pub async fn list_all(&self) -> Result<Vec<ExportConfig>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ExportConfigEntity>(&format!(
            "SELECT {SELECT_COLUMNS} FROM export_configs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().filter_map(entity_to_domain).collect())
    }

    /// Enabled configurations only; the scheduler's per-tick working set.
    pub async fn list_enabled(&self) -> Result<Vec<ExportConfig>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ExportConfigEntity>(&format!(
            "SELECT {SELECT_COLUMNS} FROM export_configs WHERE enabled = TRUE ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().filter_map(entity_to_domain).collect())
    }

    /// Find a configuration by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ExportConfig>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ExportConfigEntity>(&format!(
            "SELECT {SELECT_COLUMNS} FROM export_configs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.and_then(entity_to_domain))
    }

    /// Create a new export configuration.
    pub async fn create(&self, input: &CreateExportConfig) -> Result<ExportConfig, sqlx::Error> {
        let mapping_json =
            serde_json::to_value(&input.column_mapping).unwrap_or(serde_json::Value::Null);
        let account_ids_json =
            serde_json::to_string(&input.account_ids).unwrap_or_else(|_| "[]".to_string());

        let entity = sqlx::query_as::<_, ExportConfigEntity>(&format!(
            r#"
            INSERT INTO export_configs (
                user_id, name, data_type, spreadsheet_id, spreadsheet_name, sheet_name,
                column_mapping, include_date, append_mode, account_ids, enabled, frequency,
                export_hour, export_minute, export_interval_hours, use_account_timezone,
                account_timezone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(&input.name)
        .bind(input.data_type.as_str())
        .bind(&input.spreadsheet_id)
        .bind(&input.spreadsheet_name)
        .bind(&input.sheet_name)
        .bind(&mapping_json)
        .bind(input.include_date)
        .bind(input.append_mode)
        .bind(&account_ids_json)
        .bind(input.enabled)
        .bind(input.frequency.as_str())
        .bind(input.export_hour as i32)
        .bind(input.export_minute as i32)
        .bind(input.export_interval_hours)
        .bind(input.use_account_timezone)
        .bind(&input.account_timezone)
        .fetch_one(&self.pool)
        .await?;

        entity_to_domain(entity).ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply a partial update; absent fields keep their stored value.
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateExportConfig,
    ) -> Result<Option<ExportConfig>, sqlx::Error> {
        let mapping_json = input
            .column_mapping
            .as_ref()
            .and_then(|m| serde_json::to_value(m).ok());
        let account_ids_json = input
            .account_ids
            .as_ref()
            .and_then(|ids| serde_json::to_string(ids).ok());

        let entity = sqlx::query_as::<_, ExportConfigEntity>(&format!(
            r#"
            UPDATE export_configs SET
                name = COALESCE($2, name),
                data_type = COALESCE($3, data_type),
                spreadsheet_id = COALESCE($4, spreadsheet_id),
                spreadsheet_name = COALESCE($5, spreadsheet_name),
                sheet_name = COALESCE($6, sheet_name),
                column_mapping = COALESCE($7, column_mapping),
                include_date = COALESCE($8, include_date),
                append_mode = COALESCE($9, append_mode),
                account_ids = COALESCE($10, account_ids),
                enabled = COALESCE($11, enabled),
                frequency = COALESCE($12, frequency),
                export_hour = COALESCE($13, export_hour),
                export_minute = COALESCE($14, export_minute),
                export_interval_hours = COALESCE($15, export_interval_hours),
                use_account_timezone = COALESCE($16, use_account_timezone),
                account_timezone = COALESCE($17, account_timezone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.data_type.map(|d| d.as_str()))
        .bind(&input.spreadsheet_id)
        .bind(&input.spreadsheet_name)
        .bind(&input.sheet_name)
        .bind(&mapping_json)
        .bind(input.include_date)
        .bind(input.append_mode)
        .bind(&account_ids_json)
        .bind(input.enabled)
        .bind(input.frequency.map(|f| f.as_str()))
        .bind(input.export_hour.map(|h| h as i32))
        .bind(input.export_minute.map(|m| m as i32))
        .bind(input.export_interval_hours)
        .bind(input.use_account_timezone)
        .bind(&input.account_timezone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.and_then(entity_to_domain))
    }

    /// Delete a configuration. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM export_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist the outcome of a run attempt. Only touches run-state columns.
    pub async fn update_run_state(
        &self,
        id: Uuid,
        update: &RunStateUpdate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE export_configs
            SET last_run_at = $2, last_run_status = $3, last_run_rows = $4,
                last_run_error = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.ran_at)
        .bind(update.status.as_str())
        .bind(update.rows)
        .bind(&update.error)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Converts a database row into the domain model.
///
/// Rows with unknown enum text are dropped with a warning rather than
/// poisoning a whole batch load; mapping and scope columns parse tolerantly.
fn entity_to_domain(entity: ExportConfigEntity) -> Option<ExportConfig> {
    let Some(data_type) = ExportDataType::parse(&entity.data_type) else {
        warn!(config_id = %entity.id, data_type = %entity.data_type, "Skipping config with unknown data type");
        return None;
    };
    let Some(frequency) = ExportFrequency::parse(&entity.frequency) else {
        warn!(config_id = %entity.id, frequency = %entity.frequency, "Skipping config with unknown frequency");
        return None;
    };

    Some(ExportConfig {
        id: entity.id,
        user_id: entity.user_id,
        name: entity.name,
        data_type,
        spreadsheet_id: entity.spreadsheet_id,
        spreadsheet_name: entity.spreadsheet_name,
        sheet_name: entity.sheet_name,
        column_mapping: ColumnMapping::from_json(&entity.column_mapping),
        include_date: entity.include_date,
        append_mode: entity.append_mode,
        account_ids: parse_account_scope(&entity.account_ids),
        enabled: entity.enabled,
        frequency,
        export_hour: entity.export_hour.max(0) as u32,
        export_minute: entity.export_minute.max(0) as u32,
        export_interval_hours: entity.export_interval_hours,
        use_account_timezone: entity.use_account_timezone,
        account_timezone: entity.account_timezone,
        last_run_at: entity.last_run_at,
        last_run_status: entity.last_run_status.as_deref().and_then(RunStatus::parse),
        last_run_rows: entity.last_run_rows,
        last_run_error: entity.last_run_error,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(data_type: &str, frequency: &str) -> ExportConfigEntity {
        let now = Utc::now();
        ExportConfigEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "test".to_string(),
            data_type: data_type.to_string(),
            spreadsheet_id: "s".to_string(),
            spreadsheet_name: "s".to_string(),
            sheet_name: "Sheet1".to_string(),
            column_mapping: serde_json::json!({"name": "A"}),
            include_date: false,
            append_mode: true,
            account_ids: r#"["123","456"]"#.to_string(),
            enabled: true,
            frequency: frequency.to_string(),
            export_hour: 9,
            export_minute: 0,
            export_interval_hours: None,
            use_account_timezone: false,
            account_timezone: None,
            last_run_at: None,
            last_run_status: Some("success".to_string()),
            last_run_rows: Some(10),
            last_run_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entity_to_domain_happy_path() {
        let config = entity_to_domain(entity("campaigns", "daily")).unwrap();
        assert_eq!(config.data_type, ExportDataType::Campaigns);
        assert_eq!(config.frequency, ExportFrequency::Daily);
        assert_eq!(config.account_ids, vec!["123", "456"]);
        assert_eq!(config.last_run_status, Some(RunStatus::Success));
        assert_eq!(config.column_mapping.targets(), vec![("name", 0)]);
    }

    #[test]
    fn test_entity_with_unknown_enums_is_dropped() {
        assert!(entity_to_domain(entity("widgets", "daily")).is_none());
        assert!(entity_to_domain(entity("campaigns", "weekly")).is_none());
    }

    #[test]
    fn test_malformed_json_columns_degrade() {
        let mut bad = entity("ads", "hourly");
        bad.column_mapping = serde_json::json!(42);
        bad.account_ids = "not json".to_string();
        bad.last_run_status = Some("unknown".to_string());

        let config = entity_to_domain(bad).unwrap();
        assert!(config.column_mapping.is_empty());
        assert!(config.account_ids.is_empty());
        assert!(config.last_run_status.is_none());
    }
}
