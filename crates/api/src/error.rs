use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A validation error with a bare message and no per-field breakdown.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

/// One field's validation failure, for the response body.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                (!details.is_empty()).then_some(details),
            ),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg, None),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<crate::services::ExportError> for ApiError {
    fn from(err: crate::services::ExportError) -> Self {
        use crate::services::ExportError;

        match err {
            ExportError::ConfigNotFound => ApiError::NotFound("Export config not found".into()),
            ExportError::MissingSheetsCredential
            | ExportError::MissingAdsCredential
            | ExportError::EmptyAccountScope
            | ExportError::EmptyColumnMapping => ApiError::validation(err.to_string()),
            ExportError::TokenRefresh(_)
            | ExportError::Fetch(_)
            | ExportError::Spreadsheet(_) => ApiError::Upstream(err.to_string()),
            ExportError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "invalid value".to_string()),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            format!("{}: {}", details[0].field, details[0].message)
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Payload {
        #[validate(range(max = 23, message = "Hour must be 0-23"))]
        export_hour: u32,
        #[validate(range(max = 59, message = "Minute must be 0-59"))]
        export_minute: u32,
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_404() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::validation("export_hour: Hour must be 0-23");
        assert_eq!(
            err.to_string(),
            "Validation error: export_hour: Hour must be 0-23"
        );
    }

    #[test]
    fn test_validator_errors_carry_field_details() {
        let bad = Payload {
            export_hour: 24,
            export_minute: 99,
        };
        let err = ApiError::from(bad.validate().unwrap_err());

        let ApiError::Validation { message, details } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(message, "2 validation errors");
        assert_eq!(details.len(), 2);
        assert!(details.iter().any(|d| d.field == "export_hour"));
        assert!(details.iter().any(|d| d.message == "Minute must be 0-59"));
    }

    #[test]
    fn test_single_validator_error_message_names_the_field() {
        let bad = Payload {
            export_hour: 24,
            export_minute: 0,
        };
        let err = ApiError::from(bad.validate().unwrap_err());

        let ApiError::Validation { message, details } = err else {
            panic!("expected a validation error");
        };
        assert_eq!(message, "export_hour: Hour must be 0-23");
        assert_eq!(details.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_details_reach_the_response_body() {
        let err = ApiError::Validation {
            message: "export_hour: Hour must be 0-23".to_string(),
            details: vec![ValidationDetail {
                field: "export_hour".to_string(),
                message: "Hour must be 0-23".to_string(),
            }],
        };
        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "export_hour");
    }

    #[tokio::test]
    async fn test_bare_validation_error_omits_details() {
        let response = ApiError::validation("Account scope is empty").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("details").is_none());
    }
}
