use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use thiserror::Error;

use super::source::SourceKind;

/// Failures of the finance dashboard pipeline
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Invalid month format '{0}', expected YYYY-MM")]
    InvalidMonthFormat(String),

    #[error("Invalid range: from {from} is after to {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Invalid year '{0}', expected YYYY")]
    InvalidYear(String),

    #[error("Data source '{kind}' unavailable: {reason}")]
    SourceUnavailable { kind: SourceKind, reason: String },
}

impl FinanceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FinanceError::InvalidMonthFormat(_)
            | FinanceError::InvalidRange { .. }
            | FinanceError::InvalidYear(_) => StatusCode::BAD_REQUEST,
            FinanceError::SourceUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client; source failures stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            FinanceError::SourceUnavailable { .. } => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for FinanceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
