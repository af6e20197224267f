//! API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use climate_storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(&'static str),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Storage(StorageError::DateParse { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Storage(StorageError::DataUnavailable(_)) | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let bad_date = ApiError::from(StorageError::DateParse {
            value: "2017-02-31".into(),
        });
        assert_eq!(bad_date.status_code(), StatusCode::BAD_REQUEST);

        let empty = ApiError::from(StorageError::DataUnavailable("no observations recorded"));
        assert_eq!(empty.status_code(), StatusCode::NOT_FOUND);

        let schema = ApiError::from(StorageError::MissingTable("measurement"));
        assert_eq!(schema.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_names_bad_value() {
        let err = ApiError::from(StorageError::DateParse {
            value: "tomorrow".into(),
        });
        assert!(err.to_string().contains("tomorrow"));
    }
}
