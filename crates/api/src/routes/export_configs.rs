//! Export configuration CRUD and on-demand run endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{CreateExportConfig, ExportConfig, UpdateExportConfig};
use persistence::repositories::ExportConfigRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::ExportOutcome;

/// Response for an on-demand run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RunResponse {
    pub status: String,
    pub rows_written: usize,
}

/// `GET /api/v1/export-configs`
pub async fn list_configs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExportConfig>>, ApiError> {
    let configs = ExportConfigRepository::new(state.pool.clone())
        .list_all()
        .await?;
    Ok(Json(configs))
}

/// `POST /api/v1/export-configs`
pub async fn create_config(
    State(state): State<AppState>,
    Json(payload): Json<CreateExportConfig>,
) -> Result<(StatusCode, Json<ExportConfig>), ApiError> {
    payload.validate()?;

    let config = ExportConfigRepository::new(state.pool.clone())
        .create(&payload)
        .await?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// `GET /api/v1/export-configs/:id`
pub async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportConfig>, ApiError> {
    let config = ExportConfigRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Export config {id} not found")))?;
    Ok(Json(config))
}

/// `PUT /api/v1/export-configs/:id`
pub async fn update_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExportConfig>,
) -> Result<Json<ExportConfig>, ApiError> {
    payload.validate()?;

    let config = ExportConfigRepository::new(state.pool.clone())
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Export config {id} not found")))?;
    Ok(Json(config))
}

/// `DELETE /api/v1/export-configs/:id`
pub async fn delete_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = ExportConfigRepository::new(state.pool.clone())
        .delete(id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Export config {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/export-configs/:id/run`
///
/// Runs the export immediately, with a header row, regardless of schedule or
/// the enabled flag.
pub async fn run_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RunResponse>, ApiError> {
    let outcome = state.runner.run_interactive(id, Utc::now()).await?;

    let response = match outcome {
        ExportOutcome::Written { rows } => RunResponse {
            status: "completed".to_string(),
            rows_written: rows,
        },
        ExportOutcome::Empty => RunResponse {
            status: "empty".to_string(),
            rows_written: 0,
        },
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_response_serialization() {
        let response = RunResponse {
            status: "completed".to_string(),
            rows_written: 42,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"rows_written\":42"));
    }
}
